pub mod http_browser;
pub mod nominatim;
