//! Header text to SQL identifier transliteration.
//!
//! Cyrillic follows the Ukrainian national romanization (2010): the iotated
//! vowels and `й` have a separate spelling at the start of a word, `зг` is
//! spelled `zgh`, and the soft sign and apostrophes are dropped. Other
//! non-ASCII characters are kept as they are.

use crate::error::{Error, Result};

/// Hard cap on the length of a normalized identifier.
pub const MAX_IDENT_LEN: usize = 60;

pub fn normalize(text: &str) -> Result<String> {
    let lower = text.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let mut out = String::with_capacity(lower.len());

    for (i, &c) in chars.iter().enumerate() {
        let prev = if i == 0 { None } else { Some(chars[i - 1]) };
        let word_start = prev.map_or(true, |p| !is_word_char(p));
        match c {
            ' ' | '/' | '-' => out.push('_'),
            ',' | '.' | '\n' | '\r' | ';' | ':' | '(' | ')' => {}
            'a'..='z' | '0'..='9' | '_' => out.push(c),
            'г' if prev == Some('з') => out.push_str("gh"),
            _ => match latin(c, word_start) {
                Some(s) => out.push_str(s),
                // Postgres takes any non-ASCII character in an unquoted name.
                None if !c.is_ascii() => out.push(c),
                None => {
                    return Err(Error::Transliteration {
                        text: text.to_string(),
                        ch: c,
                    })
                }
            },
        }
    }

    let mut cut = out.len().min(MAX_IDENT_LEN);
    while !out.is_char_boundary(cut) {
        cut -= 1;
    }
    out.truncate(cut);
    Ok(out)
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || is_apostrophe(c)
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '’' | 'ʼ' | '`')
}

fn latin(c: char, word_start: bool) -> Option<&'static str> {
    let s = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' if word_start => "ye",
        'є' => "ie",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' if word_start => "yi",
        'ї' => "i",
        'й' if word_start => "y",
        'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ь' => "",
        'ю' if word_start => "yu",
        'ю' => "iu",
        'я' if word_start => "ya",
        'я' => "ia",
        c if is_apostrophe(c) => "",
        _ => return None,
    };
    Some(s)
}
