//! Language tables shared by the OCR and translation layers.
//!
//! The two tables are joined on a canonical name: the Tesseract display name
//! up to its first `;`, lowercased (`"Spanish; Castilian"` -> `"spanish"`).

/// Display name of a Tesseract language code.
pub fn tesseract_language_name(code: &str) -> Option<&'static str> {
    TESSERACT_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

pub fn is_tesseract_language(code: &str) -> bool {
    tesseract_language_name(code).is_some()
}

/// Join key for a Tesseract display name.
pub fn canonical_name(display_name: &str) -> String {
    display_name
        .split(';')
        .next()
        .unwrap_or(display_name)
        .trim()
        .to_lowercase()
}

/// Canonical name of a Tesseract language code.
pub fn canonical_name_for_code(code: &str) -> Option<String> {
    tesseract_language_name(code).map(canonical_name)
}

/// Translation service code for a canonical name, compared case-insensitively.
pub fn translate_code_for(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    TRANSLATE_LANGUAGES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(code, _)| *code)
}

/// Name of a translation service code.
pub fn translate_language_name(code: &str) -> Option<&'static str> {
    let code = code.trim().to_lowercase();
    TRANSLATE_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Tesseract trained-data codes and their display names.
pub const TESSERACT_LANGUAGES: &[(&str, &str)] = &[
    ("afr", "Afrikaans"),
    ("sqi", "Albanian"),
    ("amh", "Amharic"),
    ("ara", "Arabic"),
    ("hye", "Armenian"),
    ("asm", "Assamese"),
    ("aze", "Azerbaijani"),
    ("aze_cyrl", "Azerbaijani - Cyrilic"),
    ("eus", "Basque"),
    ("bel", "Belarusian"),
    ("ben", "Bengali"),
    ("bos", "Bosnian"),
    ("bre", "Breton"),
    ("bul", "Bulgarian"),
    ("mya", "Burmese"),
    ("cat", "Catalan; Valencian"),
    ("ceb", "Cebuano"),
    ("khm", "Central Khmer"),
    ("chr", "Cherokee"),
    ("chi_sim", "Chinese - Simplified"),
    ("chi_tra", "Chinese - Traditional"),
    ("cos", "Corsican"),
    ("hrv", "Croatian"),
    ("ces", "Czech"),
    ("dan", "Danish"),
    ("nld", "Dutch; Flemish"),
    ("dzo", "Dzongkha"),
    ("eng", "English"),
    ("enm", "English, Middle (1100-1500)"),
    ("epo", "Esperanto"),
    ("est", "Estonian"),
    ("fao", "Faroese"),
    ("fil", "Filipino (old - Tagalog)"),
    ("fin", "Finnish"),
    ("fra", "French"),
    ("frm", "French, Middle (ca.1400-1600)"),
    ("glg", "Galician"),
    ("kat", "Georgian"),
    ("kat_old", "Georgian - Old"),
    ("deu", "German"),
    ("frk", "German - Fraktur"),
    ("grc", "Greek, Ancient (to 1453) (contrib)"),
    ("ell", "Greek, Modern (1453-)"),
    ("guj", "Gujarati"),
    ("hat", "Haitian; Haitian Creole"),
    ("heb", "Hebrew"),
    ("hin", "Hindi"),
    ("hun", "Hungarian"),
    ("isl", "Icelandic"),
    ("ind", "Indonesian"),
    ("iku", "Inuktitut"),
    ("gle", "Irish"),
    ("ita", "Italian"),
    ("ita_old", "Italian - Old"),
    ("jpn", "Japanese"),
    ("jav", "Javanese"),
    ("kan", "Kannada"),
    ("kaz", "Kazakh"),
    ("kir", "Kirghiz; Kyrgyz"),
    ("kor", "Korean"),
    ("kor_vert", "Korean (vertical)"),
    ("kmr", "Kurmanji (Kurdish - Latin Script)"),
    ("lao", "Lao"),
    ("lat", "Latin"),
    ("lav", "Latvian"),
    ("lit", "Lithuanian"),
    ("ltz", "Luxembourgish"),
    ("mkd", "Macedonian"),
    ("msa", "Malay"),
    ("mal", "Malayalam"),
    ("mlt", "Maltese"),
    ("mri", "Maori"),
    ("mar", "Marathi"),
    ("equ", "Math / equation detection module"),
    ("mon", "Mongolian"),
    ("nep", "Nepali"),
    ("nor", "Norwegian"),
    ("oci", "Occitan (post 1500)"),
    ("osd", "Orientation and script detection module"),
    ("ori", "Oriya"),
    ("pan", "Panjabi; Punjabi"),
    ("fas", "Persian"),
    ("pol", "Polish"),
    ("por", "Portuguese"),
    ("pus", "Pushto; Pashto"),
    ("que", "Quechua"),
    ("ron", "Romanian; Moldavian; Moldovan"),
    ("rus", "Russian"),
    ("san", "Sanskrit"),
    ("gla", "Scottish Gaelic"),
    ("srp", "Serbian"),
    ("srp_latn", "Serbian - Latin"),
    ("snd", "Sindhi"),
    ("sin", "Sinhala; Sinhalese"),
    ("slk", "Slovak"),
    ("slv", "Slovenian"),
    ("spa", "Spanish; Castilian"),
    ("spa_old", "Spanish; Castilian - Old"),
    ("sun", "Sundanese"),
    ("swa", "Swahili"),
    ("swe", "Swedish"),
    ("syr", "Syriac"),
    ("tgk", "Tajik"),
    ("tam", "Tamil"),
    ("tat", "Tatar"),
    ("tel", "Telugu"),
    ("tha", "Thai"),
    ("bod", "Tibetan"),
    ("tir", "Tigrinya"),
    ("ton", "Tonga"),
    ("tur", "Turkish"),
    ("uig", "Uighur; Uyghur"),
    ("ukr", "Ukrainian"),
    ("urd", "Urdu"),
    ("uzb", "Uzbek"),
    ("uzb_cyrl", "Uzbek - Cyrilic"),
    ("vie", "Vietnamese"),
    ("cym", "Welsh"),
    ("fry", "Western Frisian"),
    ("yid", "Yiddish"),
    ("yor", "Yoruba"),
];

/// Translation service codes and their lowercase names.
///
/// Order matters where a name appears twice: the first code wins.
pub const TRANSLATE_LANGUAGES: &[(&str, &str)] = &[
    ("af", "afrikaans"),
    ("sq", "albanian"),
    ("am", "amharic"),
    ("ar", "arabic"),
    ("hy", "armenian"),
    ("as", "assamese"),
    ("az", "azerbaijani"),
    ("eu", "basque"),
    ("be", "belarusian"),
    ("bn", "bengali"),
    ("bs", "bosnian"),
    ("bg", "bulgarian"),
    ("my", "burmese"),
    ("ca", "catalan"),
    ("ceb", "cebuano"),
    ("ny", "chichewa"),
    ("zh-cn", "chinese (simplified)"),
    ("zh-tw", "chinese (traditional)"),
    ("co", "corsican"),
    ("hr", "croatian"),
    ("cs", "czech"),
    ("da", "danish"),
    ("nl", "dutch"),
    ("en", "english"),
    ("eo", "esperanto"),
    ("et", "estonian"),
    ("tl", "filipino"),
    ("fi", "finnish"),
    ("fr", "french"),
    ("fy", "frisian"),
    ("gl", "galician"),
    ("ka", "georgian"),
    ("de", "german"),
    ("el", "greek"),
    ("gu", "gujarati"),
    ("ht", "haitian creole"),
    ("ha", "hausa"),
    ("haw", "hawaiian"),
    ("iw", "hebrew"),
    ("he", "hebrew"),
    ("hi", "hindi"),
    ("hmn", "hmong"),
    ("hu", "hungarian"),
    ("is", "icelandic"),
    ("ig", "igbo"),
    ("id", "indonesian"),
    ("ga", "irish"),
    ("it", "italian"),
    ("ja", "japanese"),
    ("jw", "javanese"),
    ("kn", "kannada"),
    ("kk", "kazakh"),
    ("km", "khmer"),
    ("ko", "korean"),
    ("ku", "kurdish (kurmanji)"),
    ("ky", "kyrgyz"),
    ("lo", "lao"),
    ("la", "latin"),
    ("lv", "latvian"),
    ("lt", "lithuanian"),
    ("lb", "luxembourgish"),
    ("mk", "macedonian"),
    ("mg", "malagasy"),
    ("ms", "malay"),
    ("ml", "malayalam"),
    ("mt", "maltese"),
    ("mi", "maori"),
    ("mr", "marathi"),
    ("mn", "mongolian"),
    ("ne", "nepali"),
    ("no", "norwegian"),
    ("or", "odia"),
    ("ps", "pashto"),
    ("fa", "persian"),
    ("pl", "polish"),
    ("pt", "portuguese"),
    ("pa", "punjabi"),
    ("qu", "quechua"),
    ("ro", "romanian"),
    ("ru", "russian"),
    ("sa", "sanskrit"),
    ("sm", "samoan"),
    ("gd", "scots gaelic"),
    ("sr", "serbian"),
    ("st", "southern sotho"),
    ("sn", "shona"),
    ("sd", "sindhi"),
    ("si", "sinhala"),
    ("sk", "slovak"),
    ("sl", "slovenian"),
    ("so", "somali"),
    ("es", "spanish"),
    ("su", "sundanese"),
    ("sw", "swahili"),
    ("sv", "swedish"),
    ("tg", "tajik"),
    ("ta", "tamil"),
    ("tt", "tatar"),
    ("te", "telugu"),
    ("th", "thai"),
    ("tr", "turkish"),
    ("uk", "ukrainian"),
    ("ur", "urdu"),
    ("ug", "uyghur"),
    ("uz", "uzbek"),
    ("vi", "vietnamese"),
    ("cy", "welsh"),
    ("xh", "xhosa"),
    ("yi", "yiddish"),
    ("yo", "yoruba"),
    ("zu", "zulu"),
];
