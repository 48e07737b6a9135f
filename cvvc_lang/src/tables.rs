// Lookup tables from kana/romaji text to abstract vowel and consonant classes.
//
// The tables are written as grouped strings, `"class=member1,member2,..."`,
// which keeps a whole row of the kana chart on one line. At build time each
// group is exploded into individual `member -> class` entries. When the same
// member appears twice the later entry wins.
//
// Three maps are built:
// - vowels: the trailing unit of a mora (its last character) to a `VowelClass`
// - consonants: the leading characters of a mora to a consonant class
// - substitutes: a consonant class to the class to try when a voicebank
//   lacks the exact VC sample (palatalized forms collapse to plain ones)
//
// plus the closed set of bare morae (plain vowels and syllabic nasals) that
// never take a consonant onset.
//
// `LookupTables::builtin()` builds the compiled-in tables once per process
// and hands out a shared `&'static` reference. Custom definitions can be
// loaded from JSON through `TableDefs::from_json()`.

use crate::error::TableError;
use crate::types::VowelClass;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Trailing unit -> vowel class.
pub const VOWEL_GROUPS: &[&str] = &[
    "a=a,ぁ,あ,か,が,さ,ざ,た,だ,な,は,ば,ぱ,ま,ゃ,や,ら,わ,ァ,ア,カ,ガ,サ,ザ,タ,ダ,ナ,ハ,バ,パ,マ,ャ,ヤ,ラ,ワ",
    "e=e,ぇ,え,け,げ,せ,ぜ,て,で,ね,へ,べ,ぺ,め,れ,ゑ,ェ,エ,ケ,ゲ,セ,ゼ,テ,デ,ネ,ヘ,ベ,ペ,メ,レ,ヱ",
    "i=i,ぃ,い,き,ぎ,し,じ,ち,ぢ,に,ひ,び,ぴ,み,り,ゐ,ィ,イ,キ,ギ,シ,ジ,チ,ヂ,ニ,ヒ,ビ,ピ,ミ,リ,ヰ",
    "o=o,ぉ,お,こ,ご,そ,ぞ,と,ど,の,ほ,ぼ,ぽ,も,ょ,よ,ろ,を,ォ,オ,コ,ゴ,ソ,ゾ,ト,ド,ノ,ホ,ボ,ポ,モ,ョ,ヨ,ロ,ヲ",
    "u=u,ぅ,う,く,ぐ,す,ず,つ,づ,ぬ,ふ,ぶ,ぷ,む,ゅ,ゆ,る,ゥ,ウ,ク,グ,ス,ズ,ツ,ヅ,ヌ,フ,ブ,プ,ム,ュ,ユ,ル,ヴ",
    "n=n,ん",
    "N=ン",
    "・=っ,ッ",
];

/// Leading characters -> consonant class. Members are whole kana morae
/// (hiragana and katakana) or romaji onsets; lookups try the whole text,
/// then 2 characters, then 1.
pub const CONSONANT_GROUPS: &[&str] = &[
    "b=b,ば,ぶ,べ,ぼ,バ,ブ,ベ,ボ",
    "by=by,び,びぇ,びゃ,びゅ,びょ,ビ,ビェ,ビャ,ビュ,ビョ",
    "ch=ch,ち,ちぇ,ちゃ,ちゅ,ちょ,チ,チェ,チャ,チュ,チョ",
    "d=d,だ,で,ど,どぅ,ダ,デ,ド,ドゥ",
    "dy=dy,でぃ,でゅ,ディ,デュ",
    "f=f,ふ,ふぁ,ふぃ,ふぇ,ふぉ,フ,ファ,フィ,フェ,フォ",
    "g=g,が,ぐ,げ,ご,ガ,グ,ゲ,ゴ",
    "gy=gy,ぎ,ぎぇ,ぎゃ,ぎゅ,ぎょ,ギ,ギェ,ギャ,ギュ,ギョ",
    "h=h,は,へ,ほ,ハ,ヘ,ホ",
    "hy=hy,ひ,ひぇ,ひゃ,ひゅ,ひょ,ヒ,ヒェ,ヒャ,ヒュ,ヒョ",
    "j=j,じ,じぇ,じゃ,じゅ,じょ,ぢ,ジ,ジェ,ジャ,ジュ,ジョ,ヂ",
    "k=k,か,く,け,こ,カ,ク,ケ,コ",
    "ky=ky,き,きぇ,きゃ,きゅ,きょ,キ,キェ,キャ,キュ,キョ",
    "m=m,ま,む,め,も,マ,ム,メ,モ",
    "my=my,み,みぇ,みゃ,みゅ,みょ,ミ,ミェ,ミャ,ミュ,ミョ",
    "n=n,な,ぬ,ね,の,ナ,ヌ,ネ,ノ",
    "ny=ny,に,にぇ,にゃ,にゅ,にょ,ニ,ニェ,ニャ,ニュ,ニョ",
    "p=p,ぱ,ぷ,ぺ,ぽ,パ,プ,ペ,ポ",
    "py=py,ぴ,ぴぇ,ぴゃ,ぴゅ,ぴょ,ピ,ピェ,ピャ,ピュ,ピョ",
    "r=r,ら,る,れ,ろ,ラ,ル,レ,ロ",
    "ry=ry,り,りぇ,りゃ,りゅ,りょ,リ,リェ,リャ,リュ,リョ",
    "s=s,さ,す,すぃ,せ,そ,サ,ス,スィ,セ,ソ",
    "sh=sh,し,しぇ,しゃ,しゅ,しょ,シ,シェ,シャ,シュ,ショ",
    "t=t,た,て,と,とぅ,タ,テ,ト,トゥ",
    "ts=ts,つ,つぁ,つぃ,つぇ,つぉ,ツ,ツァ,ツィ,ツェ,ツォ",
    "ty=ty,てぃ,てゅ,ティ,テュ",
    "v=v,ヴ,ヴぁ,ヴぃ,ヴぇ,ヴぉ,ゔ",
    "w=w,わ,うぃ,うぇ,うぉ,ワ,ウィ,ウェ,ウォ",
    "y=y,や,ゆ,よ,いぇ,ヤ,ユ,ヨ,イェ",
    "z=z,ざ,ず,ずぃ,ぜ,ぞ,づ,ザ,ズ,ズィ,ゼ,ゾ,ヅ",
];

/// Substitute class -> consonant classes that may fall back to it.
pub const SUBSTITUTE_GROUPS: &[&str] = &[
    "b=by",
    "d=dy",
    "g=gy",
    "h=hy",
    "k=ky",
    "m=my",
    "n=ny",
    "p=py",
    "r=ry",
    "s=sh",
    "t=ty",
    "z=j",
];

/// Plain vowels and syllabic nasals.
pub const BARE_MORAE: &[&str] = &[
    "あ", "い", "う", "え", "お", "を", "ん", "ア", "イ", "ウ", "エ", "オ", "ヲ", "ン", "a", "i",
    "u", "e", "o", "n",
];

/// Grouped table definitions, as compiled in or loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefs {
    pub vowels: Vec<String>,
    pub consonants: Vec<String>,
    #[serde(default)]
    pub substitutes: Vec<String>,
    #[serde(default)]
    pub bare_morae: Vec<String>,
}

impl TableDefs {
    /// The compiled-in Japanese CVVC definitions.
    pub fn builtin() -> Self {
        let owned = |groups: &[&str]| -> Vec<String> {
            groups.iter().map(|g| g.to_string()).collect()
        };
        TableDefs {
            vowels: owned(VOWEL_GROUPS),
            consonants: owned(CONSONANT_GROUPS),
            substitutes: owned(SUBSTITUTE_GROUPS),
            bare_morae: owned(BARE_MORAE),
        }
    }

    /// Parse custom definitions from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Explode `"class=member1,member2"` groups into `(member, class)` pairs, in
/// definition order. Blank members are skipped; a group with no `=` or an
/// empty class is an error.
pub fn explode_groups<'a, I>(groups: I) -> Result<Vec<(&'a str, &'a str)>, TableError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut pairs = Vec::new();
    for group in groups {
        let (class, members) = group
            .split_once('=')
            .ok_or_else(|| TableError::MalformedGroup(group.to_string()))?;
        let class = class.trim();
        if class.is_empty() {
            return Err(TableError::MalformedGroup(group.to_string()));
        }
        pairs.extend(
            members
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(|m| (m, class)),
        );
    }
    Ok(pairs)
}

static BUILTIN: LazyLock<LookupTables> = LazyLock::new(|| {
    LookupTables::from_defs(&TableDefs::builtin()).expect("built-in CVVC tables are malformed")
});

/// Immutable phonetic lookup tables.
#[derive(Debug, Clone)]
pub struct LookupTables {
    vowels: FxHashMap<String, VowelClass>,
    consonants: FxHashMap<String, String>,
    substitutes: FxHashMap<String, String>,
    bare_morae: FxHashSet<String>,
}

impl LookupTables {
    /// The compiled-in tables, built on first use.
    pub fn builtin() -> &'static LookupTables {
        &BUILTIN
    }

    /// Build tables from grouped definitions.
    pub fn from_defs(defs: &TableDefs) -> Result<Self, TableError> {
        let mut vowels = FxHashMap::default();
        for (member, class) in explode_groups(defs.vowels.iter().map(String::as_str))? {
            let class = VowelClass::from_class_name(class)
                .ok_or_else(|| TableError::UnknownVowelClass(class.to_string()))?;
            vowels.insert(member.to_string(), class);
        }

        Ok(LookupTables {
            vowels,
            consonants: string_map(&defs.consonants)?,
            substitutes: string_map(&defs.substitutes)?,
            bare_morae: defs.bare_morae.iter().cloned().collect(),
        })
    }

    /// Vowel class of a single trailing unit.
    pub fn vowel_class_of(&self, unit: &str) -> Option<VowelClass> {
        self.vowels.get(unit).copied()
    }

    /// Vowel class of the last character of `text`.
    pub fn trailing_vowel_class(&self, text: &str) -> Option<VowelClass> {
        let last = text.chars().next_back()?;
        let mut buf = [0u8; 4];
        self.vowel_class_of(last.encode_utf8(&mut buf))
    }

    /// Consonant class of an exact key.
    pub fn consonant_class_of(&self, key: &str) -> Option<&str> {
        self.consonants.get(key).map(String::as_str)
    }

    /// Consonant class at the start of `text`: the whole text, then its first
    /// two characters, then its first character.
    pub fn leading_consonant_class(&self, text: &str) -> Option<&str> {
        if let Some(class) = self.consonant_class_of(text) {
            return Some(class);
        }
        for len in [2, 1] {
            // Only proper prefixes; a text of exactly `len` chars was tried above.
            let Some((end, _)) = text.char_indices().nth(len) else {
                continue;
            };
            if let Some(class) = self.consonant_class_of(&text[..end]) {
                return Some(class);
            }
        }
        None
    }

    /// Alternate class to try when `class` has no VC sample.
    pub fn substitute_class_of(&self, class: &str) -> Option<&str> {
        self.substitutes.get(class).map(String::as_str)
    }

    /// Whether `text` is a plain vowel or syllabic nasal.
    pub fn is_bare_mora(&self, text: &str) -> bool {
        self.bare_morae.contains(text)
    }
}

fn string_map(groups: &[String]) -> Result<FxHashMap<String, String>, TableError> {
    Ok(explode_groups(groups.iter().map(String::as_str))?
        .into_iter()
        .map(|(member, class)| (member.to_string(), class.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(vowels: &[&str], consonants: &[&str]) -> TableDefs {
        TableDefs {
            vowels: vowels.iter().map(|s| s.to_string()).collect(),
            consonants: consonants.iter().map(|s| s.to_string()).collect(),
            substitutes: vec![],
            bare_morae: vec![],
        }
    }

    #[test]
    fn test_explode_groups() {
        let pairs = explode_groups(["a=か, さ ,", "k=k"]).unwrap();
        assert_eq!(pairs, vec![("か", "a"), ("さ", "a"), ("k", "k")]);
    }

    #[test]
    fn test_explode_rejects_missing_separator() {
        let err = explode_groups(["a,か"]).unwrap_err();
        assert!(matches!(err, TableError::MalformedGroup(g) if g == "a,か"));
    }

    #[test]
    fn test_explode_rejects_empty_class() {
        assert!(explode_groups(["=か"]).is_err());
    }

    #[test]
    fn test_duplicate_member_last_wins() {
        let tables = LookupTables::from_defs(&defs(&["a=x", "i=x"], &["k=q", "g=q"])).unwrap();
        assert_eq!(tables.vowel_class_of("x"), Some(VowelClass::I));
        assert_eq!(tables.consonant_class_of("q"), Some("g"));
    }

    #[test]
    fn test_unknown_vowel_class_rejected() {
        let err = LookupTables::from_defs(&defs(&["ä=x"], &[])).unwrap_err();
        assert!(matches!(err, TableError::UnknownVowelClass(c) if c == "ä"));
    }

    #[test]
    fn test_builtin_builds() {
        let tables = LookupTables::builtin();
        assert!(std::ptr::eq(tables, LookupTables::builtin()));
        assert_eq!(tables.vowel_class_of("か"), Some(VowelClass::A));
    }

    #[test]
    fn test_trailing_vowel_class() {
        let tables = LookupTables::builtin();
        assert_eq!(tables.trailing_vowel_class("きゃ"), Some(VowelClass::A));
        assert_eq!(tables.trailing_vowel_class("- きょ"), Some(VowelClass::O));
        assert_eq!(tables.trailing_vowel_class("ka"), Some(VowelClass::A));
        assert_eq!(tables.trailing_vowel_class("ん"), Some(VowelClass::N));
        assert_eq!(tables.trailing_vowel_class("ン"), Some(VowelClass::Nasal));
        assert_eq!(tables.trailing_vowel_class("っ"), Some(VowelClass::Glottal));
        assert_eq!(tables.trailing_vowel_class(""), None);
        assert_eq!(tables.trailing_vowel_class("R"), None);
    }

    #[test]
    fn test_leading_consonant_prefers_longer_prefix() {
        let tables = LookupTables::builtin();
        assert_eq!(tables.leading_consonant_class("か"), Some("k"));
        assert_eq!(tables.leading_consonant_class("きゃ"), Some("ky"));
        assert_eq!(tables.leading_consonant_class("ka"), Some("k"));
        assert_eq!(tables.leading_consonant_class("kya"), Some("ky"));
        assert_eq!(tables.leading_consonant_class("sha"), Some("sh"));
        assert_eq!(tables.leading_consonant_class("tsu"), Some("ts"));
    }

    #[test]
    fn test_leading_consonant_katakana() {
        let tables = LookupTables::builtin();
        assert_eq!(tables.leading_consonant_class("カ"), Some("k"));
        assert_eq!(tables.leading_consonant_class("キャ"), Some("ky"));
        assert_eq!(tables.leading_consonant_class("シュ"), Some("sh"));
        assert_eq!(tables.leading_consonant_class("ヅ"), Some("z"));
        assert_eq!(tables.leading_consonant_class("ヴァ"), Some("v"));
        assert_eq!(tables.leading_consonant_class("ア"), None);
    }

    #[test]
    fn test_every_consonant_row_covers_both_scripts() {
        let tables = LookupTables::builtin();
        let pairs = [("か", "カ"), ("ぎょ", "ギョ"), ("つぁ", "ツァ"), ("でぃ", "ディ")];
        for (hiragana, katakana) in pairs {
            assert_eq!(
                tables.leading_consonant_class(hiragana),
                tables.leading_consonant_class(katakana),
                "{hiragana} vs {katakana}"
            );
        }
    }

    #[test]
    fn test_leading_consonant_whole_text_first() {
        let tables = LookupTables::from_defs(&defs(&[], &["x=ab", "y=abc"])).unwrap();
        assert_eq!(tables.leading_consonant_class("abc"), Some("y"));
        assert_eq!(tables.leading_consonant_class("abd"), Some("x"));
    }

    #[test]
    fn test_leading_consonant_missing() {
        let tables = LookupTables::builtin();
        assert_eq!(tables.leading_consonant_class("あ"), None);
        assert_eq!(tables.leading_consonant_class(""), None);
    }

    #[test]
    fn test_substitutes() {
        let tables = LookupTables::builtin();
        assert_eq!(tables.substitute_class_of("ky"), Some("k"));
        assert_eq!(tables.substitute_class_of("sh"), Some("s"));
        assert_eq!(tables.substitute_class_of("k"), None);
    }

    #[test]
    fn test_bare_morae() {
        let tables = LookupTables::builtin();
        assert!(tables.is_bare_mora("あ"));
        assert!(tables.is_bare_mora("ん"));
        assert!(tables.is_bare_mora("a"));
        assert!(!tables.is_bare_mora("か"));
        assert!(!tables.is_bare_mora("ka"));
    }

    #[test]
    fn test_defs_from_json() {
        let json = r#"{"vowels": ["a=a"], "consonants": ["k=k"]}"#;
        let defs = TableDefs::from_json(json).unwrap();
        assert!(defs.substitutes.is_empty());
        let tables = LookupTables::from_defs(&defs).unwrap();
        assert_eq!(tables.vowel_class_of("a"), Some(VowelClass::A));
        assert!(!tables.is_bare_mora("a"));
    }

    #[test]
    fn test_defs_from_bad_json() {
        assert!(matches!(TableDefs::from_json("{"), Err(TableError::Json(_))));
    }
}
