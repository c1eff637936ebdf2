//! Lexical estimate of how deeply a source nests, taken before pest runs.
//!
//! Pest descends recursively and the builder's `max_depth` check only sees the
//! finished pairs, so deeply nested input is rejected here first. The scan
//! does not tokenize: brackets and tags inside strings and JSX text count too,
//! which can only overestimate.

/// Per-bracket counters of constructs that nest without brackets.
#[derive(Default)]
struct Level {
    /// Open JSX tags.
    tags: usize,
    /// Right-recursive operators since the last `;`, `,` or line break:
    /// assignments, `?` and `=>`.
    chain: usize,
}

/// Depth estimate and the byte offset where it was first reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Nesting {
    pub depth: usize,
    pub offset: usize,
}

/// Scans `source` and reports its deepest nesting.
pub(crate) fn nesting(source: &str) -> Nesting {
    let bytes = source.as_bytes();
    let mut levels = vec![Level::default()];
    // Open brackets plus every level's tags and chain.
    let mut total = 0usize;
    let mut deepest = Nesting { depth: 0, offset: 0 };

    let mut i = 0;
    while i < bytes.len() {
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i + 1).copied();
        match bytes[i] {
            b'(' | b'[' | b'{' => {
                levels.push(Level::default());
                total += 1;
            }
            b')' | b']' | b'}' if levels.len() > 1 => {
                if let Some(level) = levels.pop() {
                    total -= 1 + level.tags + level.chain;
                }
            }
            b'<' => {
                let level = current(&mut levels);
                match next {
                    Some(b'/') => {
                        if level.tags > 0 {
                            level.tags -= 1;
                            total -= 1;
                        }
                        i += 1;
                    }
                    Some(c) if c.is_ascii_alphabetic() || c == b'>' => {
                        level.tags += 1;
                        total += 1;
                    }
                    _ => {}
                }
            }
            b'/' if next == Some(b'>') => {
                let level = current(&mut levels);
                if level.tags > 0 {
                    level.tags -= 1;
                    total -= 1;
                }
            }
            b'>' => {
                let level = current(&mut levels);
                if prev == Some(b'=') {
                    level.chain += 1;
                    total += 1;
                } else {
                    total -= level.chain;
                    level.chain = 0;
                }
            }
            b'?' if !matches!(next, Some(b'.' | b'?')) && prev != Some(b'?') => {
                current(&mut levels).chain += 1;
                total += 1;
            }
            b'=' if !matches!(next, Some(b'=' | b'>'))
                && !matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) =>
            {
                current(&mut levels).chain += 1;
                total += 1;
            }
            b';' | b',' | b'\n' => {
                let level = current(&mut levels);
                total -= level.chain;
                level.chain = 0;
            }
            _ => {}
        }
        if total > deepest.depth {
            deepest = Nesting {
                depth: total,
                offset: i,
            };
        }
        i += 1;
    }
    deepest
}

fn current(levels: &mut [Level]) -> &mut Level {
    let last = levels.len() - 1;
    &mut levels[last]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(source: &str) -> usize {
        nesting(source).depth
    }

    #[test]
    fn test_brackets() {
        assert_eq!(depth("1 + 2"), 0);
        assert_eq!(depth("f(a, [b, { c: 1 }])"), 3);
        assert_eq!(depth(&format!("{}1{}", "(".repeat(50), ")".repeat(50))), 50);
        assert_eq!(nesting("((1))").offset, 1);
    }

    #[test]
    fn test_statements_do_not_accumulate() {
        let source = "let a = 1; a = 2; for (let i = 0; i < 3; i++) { a += i; }".repeat(100);
        assert!(depth(&source) <= 3);
        assert!(depth(&"x ? 1 : 2;".repeat(500)) <= 1);
        assert!(depth(&"let v = 1\n".repeat(500)) <= 1);
    }

    #[test]
    fn test_jsx_tags() {
        assert_eq!(depth("<a><b><c /></b></a>"), 3);
        assert_eq!(depth("<><p>text</p></>"), 2);
        assert_eq!(depth(&"<div>".repeat(40)), 40);
        assert!(depth(&r#"<input type="text" value="v" name="n" />"#.repeat(300)) <= 4);
    }

    #[test]
    fn test_chains() {
        assert_eq!(depth(&"a = ".repeat(30)), 30);
        assert_eq!(depth(&"x => ".repeat(30)), 30);
        assert_eq!(depth("a === b && c !== d && e <= f && g >= h"), 0);
    }
}
