/// Signals collected from one page. Built once by the scanner, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub title: String,
    pub meta_description: Option<String>,
    pub og_image: Option<String>,
    pub canonical: Option<String>,
    pub h1_texts: Vec<String>,
    pub paragraph_texts: Vec<String>,
    pub cta_texts: Vec<String>,
    pub has_image_with_alt: bool,
    pub legal_link_found: bool,
    /// Visible text, whitespace-collapsed and truncated.
    pub page_text: String,
}
