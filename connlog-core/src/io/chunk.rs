//! Line iteration over one partition of a log file.

/// Byte range of one partition within the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionRange {
    /// Position of the partition in file order
    pub index: usize,
    /// First byte (inclusive)
    pub start: usize,
    /// Last byte (exclusive)
    pub end: usize,
}

impl PartitionRange {
    /// Number of bytes in the range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The bytes of one partition.
#[derive(Debug, Clone, Copy)]
pub struct LogChunk<'a> {
    range: PartitionRange,
    data: &'a [u8],
}

impl<'a> LogChunk<'a> {
    pub(crate) fn new(range: PartitionRange, data: &'a [u8]) -> Self {
        Self { range, data }
    }

    /// The byte range this chunk covers.
    pub fn range(&self) -> PartitionRange {
        self.range
    }

    /// Raw bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Iterate over the lines of the chunk.
    pub fn lines(&self) -> LogLines<'a> {
        LogLines {
            data: self.data,
            pos: 0,
            base_offset: self.range.start as u64,
            number: 0,
        }
    }
}

/// Classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A connection record
    Record,
    /// A Zeek `#` directive line (`#separator`, `#fields`, ...)
    Directive,
    /// Nothing but whitespace
    Blank,
}

/// One line of the log, without its terminator.
#[derive(Debug, Clone, Copy)]
pub struct LogLine<'a> {
    /// 1-based line number relative to the start of the chunk
    pub number: u64,
    /// Absolute byte offset of the line in the file
    pub offset: u64,
    /// Line content, `\r\n` and `\n` stripped
    pub bytes: &'a [u8],
}

impl<'a> LogLine<'a> {
    /// Classify the line.
    pub fn kind(&self) -> LineKind {
        if self.bytes.first() == Some(&b'#') {
            LineKind::Directive
        } else if !self.bytes.contains(&b'\t')
            && self.bytes.iter().all(|b| b.is_ascii_whitespace())
        {
            // A tab means fields, however empty; those must reach the parser.
            LineKind::Blank
        } else {
            LineKind::Record
        }
    }

    /// Line content as UTF-8.
    pub fn text(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }
}

/// Iterator returned by [`LogChunk::lines`].
#[derive(Debug)]
pub struct LogLines<'a> {
    data: &'a [u8],
    pos: usize,
    base_offset: u64,
    number: u64,
}

impl<'a> Iterator for LogLines<'a> {
    type Item = LogLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }

        let rest = &self.data[self.pos..];
        let (line, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        let line = line.strip_suffix(b"\r").unwrap_or(line);

        self.number += 1;
        let item = LogLine {
            number: self.number,
            offset: self.base_offset + self.pos as u64,
            bytes: line,
        };
        self.pos += consumed;
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(start: usize, data: &[u8]) -> LogChunk<'_> {
        LogChunk::new(
            PartitionRange {
                index: 0,
                start,
                end: start + data.len(),
            },
            data,
        )
    }

    #[test]
    fn test_lines_offsets_and_numbers() {
        let data = b"one\ntwo\r\nthree";
        let lines: Vec<_> = chunk(100, data).lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].bytes, b"one");
        assert_eq!(lines[0].offset, 100);
        assert_eq!(lines[1].bytes, b"two");
        assert_eq!(lines[1].offset, 104);
        assert_eq!(lines[1].number, 2);
        assert_eq!(lines[2].text(), Some("three"));
        assert_eq!(lines[2].offset, 109);
    }

    #[test]
    fn test_line_kinds() {
        let data = b"#separator \\x09\n\n  \n1.0\tx\n";
        let kinds: Vec<_> = chunk(0, data).lines().map(|l| l.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Directive,
                LineKind::Blank,
                LineKind::Blank,
                LineKind::Record
            ]
        );
    }

    #[test]
    fn test_whitespace_with_tabs_is_record() {
        let data = b" \t \t\t \t\n\t\n \r\n";
        let kinds: Vec<_> = chunk(0, data).lines().map(|l| l.kind()).collect();
        assert_eq!(
            kinds,
            vec![LineKind::Record, LineKind::Record, LineKind::Blank]
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let data = b"ok\n\xff\xfe\n";
        let lines: Vec<_> = chunk(0, data).lines().collect();
        assert_eq!(lines[0].text(), Some("ok"));
        assert_eq!(lines[1].text(), None);
    }

    #[test]
    fn test_empty_chunk() {
        assert_eq!(chunk(0, b"").lines().count(), 0);
    }
}
