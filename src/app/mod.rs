pub mod gather_use_case;
pub mod ports;
