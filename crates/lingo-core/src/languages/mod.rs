/// A learnable language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

const fn lang(code: &'static str, name: &'static str) -> Language {
    Language { code, name }
}

/// Name used when a stored code is not in the catalog.
pub const DEFAULT_LANGUAGE_NAME: &str = "Spanish";

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    lang("en", "English (US)"),
    lang("es", "Spanish"),
    lang("fr", "French"),
    lang("de", "German"),
    lang("it", "Italian"),
    lang("jp", "Japanese"),
    lang("zh", "Chinese"),
    lang("pt", "Portuguese (BR)"),
    lang("pt-pt", "Portuguese (PT)"),
    lang("ru", "Russian"),
    lang("nl", "Dutch"),
    lang("ko", "Korean"),
    lang("ar", "Arabic"),
    lang("hi", "Hindi"),
    lang("tr", "Turkish"),
    lang("sv", "Swedish"),
    lang("el", "Greek"),
    lang("pl", "Polish"),
    lang("vi", "Vietnamese"),
    lang("th", "Thai"),
    lang("id", "Indonesian"),
    lang("uk", "Ukrainian"),
    lang("he", "Hebrew"),
    lang("da", "Danish"),
    lang("no", "Norwegian"),
    lang("cs", "Czech"),
    lang("hu", "Hungarian"),
    lang("ro", "Romanian"),
    lang("ca", "Catalan"),
    lang("eo", "Esperanto"),
];

pub fn find(code: &str) -> Option<&'static Language> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.code == code)
}

/// Display name for a language code, as sent to the content provider.
pub fn language_name(code: &str) -> &'static str {
    find(code).map(|l| l.name).unwrap_or(DEFAULT_LANGUAGE_NAME)
}
