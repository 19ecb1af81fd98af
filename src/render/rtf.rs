//! RTF → plain text.
//!
//! Keeps visible body text and paragraph breaks. Every destination group
//! (font and color tables, document info, pictures, `{\*\...}` groups) is
//! dropped together with its children.

use super::{RenderError, Renderer};

/// Control words whose group carries no visible text.
const DESTINATIONS: &[&str] = &[
    "aftncn", "aftnsep", "aftnsepc", "annotation", "atnauthor", "atndate", "atnicn", "atnid",
    "atnparent", "atnref", "atntime", "atrfend", "atrfstart", "author", "background",
    "bkmkend", "bkmkstart", "blipuid", "buptim", "category", "colorschememapping", "colortbl",
    "comment", "company", "creatim", "datafield", "datastore", "defchp", "defpap", "do",
    "doccomm", "docvar", "dptxbxtext", "ebcend", "ebcstart", "factoidname", "falt", "fchars",
    "ffdeftext", "ffentrymcr", "ffexitmcr", "ffformat", "ffhelptext", "ffl", "ffname",
    "ffstattext", "file", "filetbl", "fldinst", "fldtype", "fname", "fontemb", "fontfile",
    "fonttbl", "footer", "footerf", "footerl", "footerr", "footnote", "formfield", "ftncn",
    "ftnsep", "ftnsepc", "g", "generator", "gridtbl", "header", "headerf", "headerl",
    "headerr", "hl", "hlfr", "hlinkbase", "hlloc", "hlsrc", "hsv", "htmltag", "info",
    "keycode", "keywords", "latentstyles", "lchars", "levelnumbers", "leveltext", "lfolevel",
    "linkval", "list", "listlevel", "listname", "listoverride", "listoverridetable",
    "listpicture", "liststylename", "listtable", "listtext", "lsdlockedexcept", "macc",
    "mailmerge", "manager", "mmath", "mmathPict", "mmathPr", "nesttableprops", "nextfile",
    "nonesttables", "objalias", "objclass", "objdata", "object", "objname", "objsect",
    "objtime", "oldcprops", "oldpprops", "oldsprops", "oldtprops", "oleclsid", "operator",
    "panose", "password", "passwordhash", "pgp", "pgptbl", "picprop", "pict", "pn",
    "pnseclvl", "pntext", "pntxta", "pntxtb", "printim", "private", "propname", "protend",
    "protstart", "protusertbl", "pxe", "result", "revtbl", "revtim", "rsidtbl", "rxe", "shp",
    "shpgrp", "shpinst", "shppict", "shprslt", "shptxt", "sn", "sp", "staticval",
    "stylesheet", "subject", "sv", "svb", "tc", "template", "themedata", "title", "txe", "ud",
    "upr", "userprops", "wgrffmtfilter", "windowcaption", "writereservation",
    "writereservhash", "xe", "xform", "xmlattrname", "xmlattrvalue", "xmlclose", "xmlname",
    "xmlnstbl", "xmlopen",
];

/// Windows-1252 bytes 0x80..=0x9F. The rest of the code page matches Latin-1.
const CP1252_80_9F: [char; 32] = [
    '\u{20ac}', '\u{81}', '\u{201a}', '\u{192}', '\u{201e}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2c6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8d}', '\u{17d}', '\u{8f}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201c}', '\u{201d}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2dc}', '\u{2122}', '\u{161}', '\u{203a}', '\u{153}', '\u{9d}', '\u{17e}', '\u{178}',
];

#[derive(Debug, Default, Clone, Copy)]
pub struct RtfRenderer;

impl Renderer for RtfRenderer {
    fn render(&self, bytes: &[u8]) -> Result<String, RenderError> {
        let decoded = String::from_utf8_lossy(bytes);
        // Editors that save as UTF-8 may prepend a byte-order mark.
        let source = decoded.trim_start_matches('\u{feff}').trim_start();
        if !source.starts_with("{\\rtf") {
            return Err(RenderError::NotRtf);
        }
        rtf_to_text(source)
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Word { name: String, arg: Option<i64> },
    /// `\` followed by a non-letter.
    Symbol(char),
    Hex(u8),
    Char(char),
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    fn new(source: &str) -> Self {
        Tokenizer {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Called with `pos` just past a backslash. A trailing backslash yields nothing.
    fn control(&mut self) -> Option<Token> {
        let c = self.peek_at(0)?;

        if c.is_ascii_alphabetic() {
            let start = self.pos;
            while self.peek_at(0).is_some_and(|c| c.is_ascii_alphabetic()) {
                self.pos += 1;
            }
            let name: String = self.chars[start..self.pos].iter().collect();
            let arg = self.numeric_arg();
            // One space delimits the control word and is not text.
            if self.peek_at(0) == Some(' ') {
                self.pos += 1;
            }
            return Some(Token::Word { name, arg });
        }

        self.pos += 1;
        if c == '\'' {
            let hi = self.peek_at(0).and_then(|c| c.to_digit(16));
            let lo = self.peek_at(1).and_then(|c| c.to_digit(16));
            if let (Some(hi), Some(lo)) = (hi, lo) {
                self.pos += 2;
                return Some(Token::Hex((hi * 16 + lo) as u8));
            }
        }
        Some(Token::Symbol(c))
    }

    fn numeric_arg(&mut self) -> Option<i64> {
        let negative = self.peek_at(0) == Some('-');
        let digits_from = self.pos + usize::from(negative);
        let mut end = digits_from;
        while end - digits_from < 10 && self.chars.get(end).is_some_and(|c| c.is_ascii_digit()) {
            end += 1;
        }
        if end == digits_from {
            return None;
        }
        let digits: String = self.chars[digits_from..end].iter().collect();
        self.pos = end;
        let value: i64 = digits.parse().ok()?;
        Some(if negative { -value } else { value })
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while let Some(c) = self.peek_at(0) {
            self.pos += 1;
            match c {
                // Raw line breaks in the source are formatting, not text.
                '\r' | '\n' => {}
                '{' => return Some(Token::Open),
                '}' => return Some(Token::Close),
                '\\' => {
                    if let Some(token) = self.control() {
                        return Some(token);
                    }
                }
                _ => return Some(Token::Char(c)),
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct Group {
    ignorable: bool,
    /// Fallback characters that follow each `\uN`.
    uc_skip: usize,
}

impl Default for Group {
    fn default() -> Self {
        Group {
            ignorable: false,
            uc_skip: 1,
        }
    }
}

pub fn rtf_to_text(source: &str) -> Result<String, RenderError> {
    let mut stack: Vec<Group> = Vec::new();
    let mut group = Group::default();
    let mut skip = 0usize;
    let mut high_surrogate: Option<u32> = None;
    let mut out = String::new();

    for token in Tokenizer::new(source) {
        match token {
            Token::Open => {
                skip = 0;
                stack.push(group);
            }
            Token::Close => {
                skip = 0;
                group = stack
                    .pop()
                    .ok_or_else(|| RenderError::Malformed("unbalanced closing brace".into()))?;
            }
            Token::Symbol(c) => {
                skip = 0;
                if c == '*' {
                    group.ignorable = true;
                } else if !group.ignorable {
                    if let Some(s) = control_symbol(c) {
                        out.push(s);
                    }
                }
            }
            Token::Word { name, arg } => {
                skip = 0;
                if DESTINATIONS.contains(&name.as_str()) {
                    group.ignorable = true;
                } else if !group.ignorable {
                    match name.as_str() {
                        "uc" => group.uc_skip = arg.map_or(1, |n| n.max(0) as usize),
                        "u" => {
                            if let Some(c) = arg.and_then(|n| decode_unicode(n, &mut high_surrogate)) {
                                out.push(c);
                            }
                            skip = group.uc_skip;
                        }
                        other => {
                            if let Some(s) = special_word(other) {
                                out.push_str(s);
                            }
                        }
                    }
                }
            }
            Token::Hex(b) => {
                if skip > 0 {
                    skip -= 1;
                } else if !group.ignorable {
                    out.push(cp1252(b));
                }
            }
            Token::Char(c) => {
                if skip > 0 {
                    skip -= 1;
                } else if !group.ignorable {
                    out.push(c);
                }
            }
        }
    }

    Ok(out)
}

fn control_symbol(c: char) -> Option<char> {
    match c {
        '~' => Some('\u{a0}'),
        '-' => Some('\u{ad}'),
        '_' => Some('\u{2011}'),
        '{' | '}' | '\\' => Some(c),
        '\n' | '\r' => Some('\n'),
        _ => None,
    }
}

fn special_word(name: &str) -> Option<&'static str> {
    Some(match name {
        "par" | "line" | "row" => "\n",
        "sect" | "page" => "\n\n",
        "tab" => "\t",
        "cell" | "nestcell" => "|",
        "emdash" => "\u{2014}",
        "endash" => "\u{2013}",
        "emspace" => "\u{2003}",
        "enspace" => "\u{2002}",
        "qmspace" => "\u{2005}",
        "bullet" => "\u{2022}",
        "lquote" => "\u{2018}",
        "rquote" => "\u{2019}",
        "ldblquote" => "\u{201c}",
        "rdblquote" => "\u{201d}",
        _ => return None,
    })
}

/// `\uN` carries a signed 16-bit code unit; astral characters arrive as a
/// surrogate pair split over two control words.
fn decode_unicode(n: i64, high_surrogate: &mut Option<u32>) -> Option<char> {
    let unit = u32::try_from(if n < 0 { n + 0x10000 } else { n }).ok()?;
    match unit {
        0xD800..=0xDBFF => {
            *high_surrogate = Some(unit);
            None
        }
        0xDC00..=0xDFFF => {
            let high = high_surrogate.take()?;
            char::from_u32(0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00))
        }
        _ => {
            *high_surrogate = None;
            char::from_u32(unit)
        }
    }
}

fn cp1252(b: u8) -> char {
    match b {
        0x80..=0x9F => CP1252_80_9F[usize::from(b - 0x80)],
        _ => char::from(b),
    }
}

// ── Tests ──
