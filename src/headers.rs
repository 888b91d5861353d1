use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::credentials::{get_token, AuthenticationError, TokenStore};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The headers attached to every API call: a bearer `Authorization` and a
/// JSON `Content-Type`. Built fresh per request and never kept around.
#[derive(Debug, Clone)]
pub struct RequestHeaders {
    authorization: HeaderValue,
    content_type: HeaderValue,
}

impl RequestHeaders {
    pub fn authorization(&self) -> &HeaderValue {
        &self.authorization
    }

    pub fn content_type(&self) -> &HeaderValue {
        &self.content_type
    }

    pub fn into_header_map(self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(AUTHORIZATION, self.authorization);
        headers.insert(CONTENT_TYPE, self.content_type);
        headers
    }
}

/// Build the headers for one request from the current contents of `store`.
pub fn build_headers(store: &dyn TokenStore) -> Result<RequestHeaders, AuthenticationError> {
    let token = get_token(store)?;
    let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|_| AuthenticationError::Malformed)?;
    authorization.set_sensitive(true);

    Ok(RequestHeaders {
        authorization,
        content_type: HeaderValue::from_static(JSON_CONTENT_TYPE),
    })
}
