//! Renderable suggestion content.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;

/// A block of suggestion content shown on the interstitial screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Words joined by single spaces.
    Paragraph { words: Vec<String> },
    Link { href: String, label: String },
    BulletedList { items: Vec<Block> },
}

impl Block {
    pub fn paragraph<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Block::Paragraph {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn link(href: impl Into<String>, label: impl Into<String>) -> Self {
        Block::Link {
            href: href.into(),
            label: label.into(),
        }
    }

    /// A bulleted list of links, in order.
    pub fn links<I, H, L>(links: I) -> Self
    where
        I: IntoIterator<Item = (H, L)>,
        H: Into<String>,
        L: Into<String>,
    {
        Block::BulletedList {
            items: links.into_iter().map(|(h, l)| Block::link(h, l)).collect(),
        }
    }

    /// Escaped HTML for the block.
    pub fn to_html(&self) -> String {
        match self {
            Block::Paragraph { words } => format!("<p>{}</p>", encode_text(&words.join(" "))),
            Block::Link { href, label } => {
                format!(
                    "<a href=\"{}\">{}</a>",
                    encode_double_quoted_attribute(href),
                    encode_text(label)
                )
            }
            Block::BulletedList { items } => {
                let items: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", item.to_html()))
                    .collect();
                format!("<ul>{}</ul>", items)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph() {
        assert_eq!(Block::paragraph(["My", "Suggestion"]).to_html(), "<p>My Suggestion</p>");
    }

    #[test]
    fn test_links_are_escaped() {
        let block = Block::links([("/search?q=a&b", "<A>")]);
        assert_eq!(
            block.to_html(),
            "<ul><li><a href=\"/search?q=a&amp;b\">&lt;A&gt;</a></li></ul>"
        );
    }

    #[test]
    fn test_quoted_href_cannot_break_out() {
        let block = Block::link("/a\" onclick=\"x", "label");
        assert_eq!(block.to_html(), "<a href=\"/a&quot; onclick=&quot;x\">label</a>");
    }
}
