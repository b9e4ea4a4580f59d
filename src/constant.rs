/// Application name and metadata constants
pub const APP_QUALIFIER: &str = "com";
pub const APP_ORGANIZATION: &str = "Docmark";
pub const APP_NAME: &str = "Docmark";

/// Diff tuning Magic Numbers
pub const MAX_CONTINUOUS_CHANGES: usize = 10;
pub const DENSE_TABLE_THRESHOLD: usize = 50;
pub const MIN_HIGHLIGHT_CHARS: usize = 1;
pub const DEFAULT_ALGORITHM: &str = "myers";

// Highlight classes shared with the export stylesheet
pub const DELETION_CLASS: &str = "modified-text";
pub const INSERTION_CLASS: &str = "added-text";

// Labels handed to the publisher
pub const BASE_LABEL: &str = "Base document";
pub const COMPARE_LABEL: &str = "Compare document";

// Placeholders shown in place of marked markup
pub const COMPARE_FIRST_PLACEHOLDER: &str =
    "<p class=\"placeholder\">Load both documents and run a comparison to see highlighted changes</p>";
pub const MARK_BASE_PLACEHOLDER: &str =
    "<p class=\"placeholder\">Click \"Mark base changes\" to view highlighted content</p>";
pub const MARK_COMPARE_PLACEHOLDER: &str =
    "<p class=\"placeholder\">Click \"Mark compare changes\" to view highlighted content</p>";
pub const MARK_FAILED_PLACEHOLDER: &str = "<p class=\"error\">Marking failed, please retry</p>";

/// Subdirectory of the data dir used when no export dir is configured
pub const EXPORT_DIR: &str = "exports";
