use url::Url;

/// A fully read GET response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Where redirects ended up
    pub final_url: Url,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub elapsed_ms: u128,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get body as UTF-8 string (lossy conversion)
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
