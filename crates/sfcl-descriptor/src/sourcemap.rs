use camino::Utf8Path;
use serde_json::json;
use sfcl_source::LineIndex;
use sfcl_source::Span;

use crate::descriptor::SourceMap;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Line-granular map from a block's content back to the composite file.
///
/// Every generated line gets one segment at column zero pointing at the
/// matching source line. The first line starts at the column right after
/// the opening tag.
pub(crate) fn line_map(
    filename: &str,
    source_root: &Utf8Path,
    source: &str,
    content: Span,
) -> SourceMap {
    let index = LineIndex::from_text(source);
    let start = index.line_col(content.start_usize());
    let text = &source[content.range()];

    let mut mappings = String::new();
    let mut prev_line = 0i64;
    let mut prev_col = 0i64;
    let mut line = i64::from(start.line);
    let mut col = i64::from(start.column);
    for (i, _) in text.split('\n').enumerate() {
        if i > 0 {
            mappings.push(';');
            line += 1;
            col = 0;
        }
        encode_vlq(&mut mappings, 0);
        encode_vlq(&mut mappings, 0);
        encode_vlq(&mut mappings, line - prev_line);
        encode_vlq(&mut mappings, col - prev_col);
        prev_line = line;
        prev_col = col;
    }

    SourceMap(json!({
        "version": 3,
        "file": filename,
        "sourceRoot": source_root.as_str(),
        "sources": [filename],
        "sourcesContent": [source],
        "names": [],
        "mappings": mappings,
    }))
}

fn encode_vlq(out: &mut String, value: i64) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = vlq & 0b1_1111;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b10_0000;
        }
        out.push(char::from(BASE64[usize::try_from(digit).unwrap_or(0)]));
        if vlq == 0 {
            break;
        }
    }
}
