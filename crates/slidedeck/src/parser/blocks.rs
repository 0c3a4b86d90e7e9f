use super::splitter::{closes_fence, opens_fence};
use super::{Block, Directive, parse_directive};

/// Parse one slide's markdown into its directives and content blocks.
pub fn parse(raw: &str) -> (Vec<Directive>, Vec<Block>) {
    let mut directives = Vec::new();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut list: Vec<String> = Vec::new();
    let mut lines = raw.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim();

        if let Some((fence_char, fence_len)) = opens_fence(trimmed) {
            end_paragraph(&mut paragraph, &mut blocks);
            end_list(&mut list, &mut blocks);
            let language = trimmed.trim_start_matches(fence_char).trim();
            let mut code = Vec::new();
            for code_line in lines.by_ref() {
                if closes_fence(code_line.trim(), fence_char, fence_len) {
                    break;
                }
                code.push(code_line);
            }
            blocks.push(Block::CodeBlock {
                language: (!language.is_empty()).then(|| language.to_string()),
                code: code.join("\n"),
            });
            continue;
        }

        if trimmed.is_empty() {
            end_paragraph(&mut paragraph, &mut blocks);
            end_list(&mut list, &mut blocks);
            continue;
        }

        if let Some(directive) = parse_directive(trimmed) {
            directives.push(directive);
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            end_paragraph(&mut paragraph, &mut blocks);
            end_list(&mut list, &mut blocks);
            blocks.push(Block::Heading {
                level,
                text: text.to_string(),
            });
            continue;
        }

        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            end_paragraph(&mut paragraph, &mut blocks);
            list.push(item.trim().to_string());
            continue;
        }

        end_list(&mut list, &mut blocks);
        paragraph.push(trimmed);
    }

    end_paragraph(&mut paragraph, &mut blocks);
    end_list(&mut list, &mut blocks);
    (directives, blocks)
}

fn heading(trimmed: &str) -> Option<(u8, &str)> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let text = trimmed[level..].strip_prefix(' ')?;
    Some((level as u8, text.trim()))
}

fn end_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph {
            text: paragraph.join(" "),
        });
        paragraph.clear();
    }
}

fn end_list(list: &mut Vec<String>, blocks: &mut Vec<Block>) {
    if !list.is_empty() {
        blocks.push(Block::List {
            items: std::mem::take(list),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_in_order() {
        let (directives, blocks) =
            parse("@name: intro\n# Title\n\nSome text\nwrapped here\n\n- one\n* two\n\n### Small");
        assert_eq!(directives.len(), 1);
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                Block::Paragraph {
                    text: "Some text wrapped here".to_string()
                },
                Block::List {
                    items: vec!["one".to_string(), "two".to_string()]
                },
                Block::Heading {
                    level: 3,
                    text: "Small".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_code_block_keeps_content_verbatim() {
        let (_, blocks) = parse("~~~\n# not a heading\n\n- not a list\n~~~\nAfter");
        assert_eq!(
            blocks[0],
            Block::CodeBlock {
                language: None,
                code: "# not a heading\n\n- not a list".to_string()
            }
        );
        assert_eq!(
            blocks[1],
            Block::Paragraph {
                text: "After".to_string()
            }
        );
    }

    #[test]
    fn test_unterminated_code_block_runs_to_end() {
        let (_, blocks) = parse("```sh\nls -la");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: Some("sh".to_string()),
                code: "ls -la".to_string()
            }]
        );
    }

    #[test]
    fn test_longer_fence_wraps_shorter_one() {
        let (_, blocks) = parse("````markdown\n```rust\nlet x = 1;\n```\n````\nAfter");
        assert_eq!(
            blocks,
            vec![
                Block::CodeBlock {
                    language: Some("markdown".to_string()),
                    code: "```rust\nlet x = 1;\n```".to_string()
                },
                Block::Paragraph {
                    text: "After".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_fence_closes_only_on_same_char() {
        let (_, blocks) = parse("~~~\n```\n~~~");
        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: None,
                code: "```".to_string()
            }]
        );
    }

    #[test]
    fn test_hash_without_space_is_text() {
        let (_, blocks) = parse("#hashtag");
        assert!(matches!(&blocks[0], Block::Paragraph { text } if text == "#hashtag"));
    }
}
