pub mod pdf_reader;
pub mod web_page_reader;
