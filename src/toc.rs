// ABOUTME: Table of contents for the rockslide application
// ABOUTME: Records (title, level, number) triples during numbering and nests them into an outline

/// Deepest heading level listed in the table of contents.
pub const TOC_MAX_LEVEL: u32 = 2;

/// One entry of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub title: String,
    pub level: u32,
    /// Slide number; `None` for placeholders filling a skipped level
    pub number: Option<usize>,
    pub sub: Vec<TocEntry>,
}

impl TocEntry {
    fn placeholder(level: u32) -> Self {
        Self {
            title: String::new(),
            level,
            number: None,
            sub: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.number.is_none()
    }
}

#[derive(Debug, Clone)]
struct FlatEntry {
    title: String,
    level: u32,
    number: usize,
}

/// Collects flat entries in numbering order.
///
/// [`TocBuilder::build`] consumes the builder, so a finished [`Toc`] can no
/// longer change.
#[derive(Debug, Default)]
pub struct TocBuilder {
    entries: Vec<FlatEntry>,
}

impl TocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, title: &str, level: u32, number: usize) {
        self.entries.push(FlatEntry {
            title: title.to_string(),
            level,
            number,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nest the recorded entries by level.
    ///
    /// An entry becomes a child of the closest earlier entry with a smaller
    /// level. When a level is skipped (1 then 3) an untitled placeholder is
    /// inserted for the missing level.
    pub fn build(self) -> Toc {
        let mut roots: Vec<TocEntry> = Vec::new();
        // index of the open entry at each depth below the root list
        let mut path: Vec<usize> = Vec::new();

        for entry in self.entries {
            let level = entry.level.max(1) as usize;

            while level < path.len() + 1 {
                path.pop();
            }
            while level > path.len() + 1 {
                let depth = path.len() + 1;
                let list = list_at(&mut roots, &path);
                if list.is_empty() {
                    list.push(TocEntry::placeholder(depth as u32));
                }
                path.push(list.len() - 1);
            }

            list_at(&mut roots, &path).push(TocEntry {
                title: entry.title,
                level: entry.level,
                number: Some(entry.number),
                sub: Vec::new(),
            });
        }

        Toc { entries: roots }
    }
}

fn list_at<'a>(roots: &'a mut Vec<TocEntry>, path: &[usize]) -> &'a mut Vec<TocEntry> {
    let mut list = roots;
    for &index in path {
        list = &mut list[index].sub;
    }
    list
}

/// A finished, read-only outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toc {
    entries: Vec<TocEntry>,
}

impl Toc {
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TocEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Toc {
    type Item = &'a TocEntry;
    type IntoIter = std::slice::Iter<'a, TocEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
