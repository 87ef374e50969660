//! Lightweight markup to HTML conversion.
//!
//! [`convert`] is a pure function: same text in, same fragment out, and it
//! never fails. Anything it does not recognise ends up as a paragraph.
//!
//! # Passes
//!
//! The conversion is a fixed sequence of passes. Each pass has a declared
//! scope, and no pass looks at text produced by a later one.
//!
//! | # | Pass | Scope |
//! |---|------|-------|
//! | 1 | `--` → `&mdash;` | line |
//! | 2 | `__bold__` → `<strong>` | line, non-greedy |
//! | 3 | `_italic_` → `<em>` | line, non-greedy |
//! | 4 | `- item` / `* item` → list item block | line |
//! | 5 | `#`…`######` heading → heading block | line |
//! | 6 | everything else → paragraph block, blank lines → nothing | line |
//! | 7 | runs of adjacent list items → one `<ul>` | block sequence |
//!
//! Passes 1–3 rewrite the text of a single line, so an emphasis span can never
//! cross a line break. Passes 4–6 classify every line into a [`Block`]. Pass 7
//! is the only one that looks across lines, and it only joins list items that
//! sit on *consecutive* lines: a blank line, heading or paragraph between two
//! lists closes the first one.
//!
//! # Output shape
//!
//! Lines are emitted one-for-one and joined with `\n`, so blank lines in the
//! source survive as empty lines in the output:
//!
//! ```text
//! # Nut Roast          <h1>Nut Roast</h1>
//!
//! * oil                <ul><li>oil</li>
//! * butter             <li>butter</li></ul>
//! ```
//!
//! # Unsupported
//!
//! No links, images, code blocks, tables or horizontal rules, and no
//! blank-line paragraph grouping: every non-blank line is its own block.

use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.+?)__").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.+?)_").unwrap());

const EM_DASH: &str = "&mdash;";

/// One classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Empty or whitespace-only line.
    Blank,
    /// Heading of rank 1 (most significant) to 6.
    Heading { rank: u8, text: String },
    /// Bullet list item; the text runs to the end of the line.
    ListItem(String),
    /// Any other line.
    Paragraph(String),
}

/// Convert markup text to an HTML fragment.
pub fn convert(text: &str) -> String {
    let blocks: Vec<Block> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| classify(&inline(line)))
        .collect();
    render_blocks(&blocks)
}

/// Passes 1–3: em-dashes, then bold, then italic, all within one line.
///
/// Bold runs before italic so `__x__` becomes one `<strong>` span rather than
/// two `<em>` spans sharing an underscore.
pub fn inline(line: &str) -> String {
    let line = line.replace("--", EM_DASH);
    let line = BOLD.replace_all(&line, "<strong>$1</strong>");
    ITALIC.replace_all(&line, "<em>$1</em>").into_owned()
}

/// Passes 4–6: decide what kind of block a single (inline-converted) line is.
pub fn classify(line: &str) -> Block {
    if line.trim().is_empty() {
        return Block::Blank;
    }
    if let Some(text) = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
    {
        return Block::ListItem(text.to_string());
    }
    if let Some((rank, text)) = heading(line) {
        return Block::Heading {
            rank,
            text: text.to_string(),
        };
    }
    Block::Paragraph(line.to_string())
}

/// Match `#{1,6} text`. Seven or more hashes is not a heading.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let text = line[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, text))
}

/// Pass 7 plus emission: one output line per block, with `<ul>`/`</ul>`
/// attached to the first and last item of every run of adjacent list items.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut lines = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        let line = match block {
            Block::Blank => String::new(),
            Block::Heading { rank, text } => format!("<h{rank}>{text}</h{rank}>"),
            Block::Paragraph(text) => format!("<p>{text}</p>"),
            Block::ListItem(text) => {
                let opens = i == 0 || !matches!(blocks[i - 1], Block::ListItem(_));
                let closes = !matches!(blocks.get(i + 1), Some(Block::ListItem(_)));
                format!(
                    "{}<li>{text}</li>{}",
                    if opens { "<ul>" } else { "" },
                    if closes { "</ul>" } else { "" },
                )
            }
        };
        lines.push(line);
    }
    lines.join("\n")
}

/// First heading line of a markup text, without its `#` prefix.
///
/// Used to derive a document title. Headings with no text are skipped;
/// returns `None` when nothing is left.
pub fn first_heading(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        heading(line.trim_end())
            .map(|(_, text)| text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}
