mod client;
mod headers;
mod transport;
mod url;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{
    ApiClient, LOGIN_PATH, LOGOUT_PATH, ME_PATH, REFRESH_PATH, REGISTER_PATH, USERS_PATH,
};
pub use headers::{client_tag_value, utc_millis};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
pub use url::{build_query_string, encode_segment, is_auth_url, resolve_url};
