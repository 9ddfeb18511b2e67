use crate::{GistDraft, GistFile, GistId, ListSource, PageRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenView {
    List(ListSource),
    Detail(GistId),
    Create,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub screen: Option<ScreenView>,
    pub loading: bool,
    pub search_term: String,
    /// Rows of the current page after client-side filtering.
    pub rows: Vec<GistRowView>,
    /// Filtered count of the fetched set.
    pub total: usize,
    pub page: PageRequest,
    pub detail: Option<DetailView>,
    pub draft: DraftView,
    pub user: Option<String>,
    pub starred_loaded: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GistRowView {
    pub id: GistId,
    pub description: String,
    pub owner: Option<String>,
    pub public: bool,
    pub updated_at: Option<String>,
    pub file_count: usize,
    pub first_file: Option<String>,
    pub language: Option<String>,
    pub preview: Option<String>,
    pub starred: bool,
    pub forked: bool,
    pub owned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: GistId,
    pub description: String,
    pub owner: Option<String>,
    pub html_url: Option<String>,
    pub public: bool,
    pub updated_at: Option<String>,
    pub files: Vec<FileView>,
    pub starred: bool,
    pub forked: bool,
    pub owned: bool,
    pub can_fork: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileView {
    pub filename: String,
    pub language: String,
    pub size: u64,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftView {
    pub draft: GistDraft,
    pub submitting: bool,
    pub last_created: Option<GistId>,
}

/// Declared language, or one guessed from the file extension.
pub fn display_language(file: &GistFile) -> String {
    match file.language.as_deref() {
        Some(language) if !language.is_empty() => language.to_string(),
        _ => language_for_filename(&file.filename).to_string(),
    }
}

pub fn language_for_filename(filename: &str) -> &'static str {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return "plaintext";
    };
    match extension.to_ascii_lowercase().as_str() {
        "js" => "javascript",
        "ts" => "typescript",
        "html" => "html",
        "css" => "css",
        "json" => "json",
        "md" => "markdown",
        "py" => "python",
        "java" => "java",
        "cs" => "csharp",
        "php" => "php",
        "rb" => "ruby",
        "go" => "go",
        "rs" => "rust",
        "vue" => "vue",
        "xml" => "xml",
        "sh" | "bash" => "shell",
        "sql" => "sql",
        "yaml" | "yml" => "yaml",
        "swift" => "swift",
        "kt" => "kotlin",
        "r" => "r",
        "pl" => "perl",
        "lua" => "lua",
        "scss" => "scss",
        "less" => "less",
        _ => "plaintext",
    }
}

/// Truncates to `limit` characters and appends `...` when something was cut.
pub fn ellipsis(value: &str, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}
