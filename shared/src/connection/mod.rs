pub mod error;
pub mod packet;
pub mod packet_header;
pub mod packet_type;
