/// Fixed bibliographic details shared by every issue of a series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub name: String,
    pub publisher: String,
    pub language: String,
    pub subjects: Vec<String>,
}

/// Curated subject tags for the magazine.
const SUBJECTS: &[&str] = &[
    "magazine",
    "science fiction",
    "fantasy",
    "science fiction magazine",
    "Science Fiction - Short Stories",
    "Science Fiction - Poetry",
    "Science Fiction & Fantasy",
    "short fiction",
    "short stories",
    "poetry",
];

impl Series {
    /// Package title, e.g. "Small Wonders Issue 12".
    pub fn issue_title(&self, issue_number: u32) -> String {
        format!("{} Issue {issue_number}", self.name)
    }

    /// Output file name, e.g. "Small Wonders Magazine Issue 12.epub".
    pub fn output_file_name(&self, issue_number: u32) -> String {
        format!("{} Magazine Issue {issue_number}.epub", self.name)
    }
}

impl Default for Series {
    fn default() -> Self {
        Self {
            name: "Small Wonders".to_string(),
            publisher: "Small Wonders LLC".to_string(),
            language: "en".to_string(),
            subjects: SUBJECTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let series = Series::default();
        assert_eq!(series.issue_title(7), "Small Wonders Issue 7");
        assert_eq!(
            series.output_file_name(7),
            "Small Wonders Magazine Issue 7.epub"
        );
    }
}
