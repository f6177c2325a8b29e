use crate::types::SequenceNumber;

const HALF_RANGE: u32 = 1 << 31;

/// Returns whether or not a wrapping sequence number is greater than another
/// sequence_greater_than(2,1) will return true
/// sequence_greater_than(1,2) will return false
/// sequence_greater_than(1,1) will return false
pub fn sequence_greater_than(s1: SequenceNumber, s2: SequenceNumber) -> bool {
    ((s1 > s2) && (s1 - s2 <= HALF_RANGE)) || ((s1 < s2) && (s2 - s1 > HALF_RANGE))
}

/// Returns whether or not a wrapping sequence number is less than another
/// sequence_less_than(1,2) will return true
/// sequence_less_than(2,1) will return false
/// sequence_less_than(1,1) will return false
pub fn sequence_less_than(s1: SequenceNumber, s2: SequenceNumber) -> bool {
    sequence_greater_than(s2, s1)
}

/// Signed distance from `a` forward to `b`, taking wrap-around into account.
///
/// # Examples
/// ```
/// # use lockstep_shared::wrapping_diff;
/// assert_eq!(wrapping_diff(1, 2), 1);
/// assert_eq!(wrapping_diff(2, 1), -1);
/// assert_eq!(wrapping_diff(u32::MAX, 0), 1);
/// assert_eq!(wrapping_diff(0, u32::MAX), -1);
/// ```
pub fn wrapping_diff(a: SequenceNumber, b: SequenceNumber) -> i32 {
    b.wrapping_sub(a) as i32
}
