//! Locating the header/body boundary.
//!
//! The canonical boundary is `\r\n\r\n`. A bare `\n\n` is accepted as a
//! lenient fallback for peers that terminate lines with `\n` only. The earliest
//! of the two wins; a `\r\n`-terminated header block can never contain `\n\n`,
//! so for well-formed messages this is exactly the first `\r\n\r\n`.

const CRLF_BOUNDARY: &[u8] = b"\r\n\r\n";
const LF_BOUNDARY: &[u8] = b"\n\n";

/// Position of the boundary inside a buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Boundary {
    /// End of the header block, excluding the boundary itself
    pub(crate) header_end: usize,
    /// First byte of the body
    pub(crate) body_start: usize,
}

/// Bytes that must be searched again when a scan resumes, since a boundary
/// may straddle the end of the previous scan.
pub(crate) const BOUNDARY_OVERLAP: usize = CRLF_BOUNDARY.len() - 1;

pub(crate) fn find_boundary(buf: &[u8]) -> Option<Boundary> {
    find_boundary_from(buf, 0)
}

/// Like [`find_boundary`], but skips the first `from` bytes, which the caller
/// has already searched without finding a boundary.
pub(crate) fn find_boundary_from(buf: &[u8], from: usize) -> Option<Boundary> {
    let from = from.min(buf.len());

    let Some(crlf) = find(&buf[from..], CRLF_BOUNDARY).map(|pos| from + pos) else {
        return find(&buf[from..], LF_BOUNDARY)
            .map(|pos| Boundary { header_end: from + pos, body_start: from + pos + LF_BOUNDARY.len() });
    };

    // only a bare \n\n starting before the \r\n\r\n can win
    match find(&buf[from..crlf], LF_BOUNDARY) {
        Some(pos) => Some(Boundary { header_end: from + pos, body_start: from + pos + LF_BOUNDARY.len() }),
        None => Some(Boundary { header_end: crlf, body_start: crlf + CRLF_BOUNDARY.len() }),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Iterates the lines of a header block, accepting both `\r\n` and `\n`.
pub(crate) fn header_lines(block: &str) -> impl Iterator<Item = &str> {
    block.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_boundary() {
        let boundary = find_boundary(b"GET / HTTP/1.1\r\nHost: a\r\n\r\nbody").unwrap();
        assert_eq!(boundary, Boundary { header_end: 23, body_start: 27 });
    }

    #[test]
    fn lf_fallback() {
        let boundary = find_boundary(b"GET / HTTP/1.1\nHost: a\n\nbody").unwrap();
        assert_eq!(boundary, Boundary { header_end: 22, body_start: 24 });
    }

    #[test]
    fn crlf_wins_over_later_lf_pair_in_body() {
        let boundary = find_boundary(b"GET / HTTP/1.1\r\n\r\nline\n\nline").unwrap();
        assert_eq!(boundary, Boundary { header_end: 14, body_start: 18 });
    }

    #[test]
    fn no_boundary_yet() {
        assert_eq!(find_boundary(b"GET / HTTP/1.1\r\nHost: a\r\n"), None);
        assert_eq!(find_boundary(b""), None);
    }

    #[test]
    fn lf_pair_before_crlf_boundary_wins() {
        let boundary = find_boundary(b"GET / HTTP/1.1\nA: 1\n\nbody\r\n\r\n").unwrap();
        assert_eq!(boundary, Boundary { header_end: 19, body_start: 21 });
    }

    #[test]
    fn resumed_search_finds_a_straddling_boundary() {
        let buf = b"GET / HTTP/1.1\r\nHost: a\r\n\r\nbody";
        // an earlier scan ended one byte short of the boundary
        let searched = 26 - BOUNDARY_OVERLAP;

        let boundary = find_boundary_from(buf, searched).unwrap();
        assert_eq!(boundary, Boundary { header_end: 23, body_start: 27 });
        assert_eq!(find_boundary_from(buf, buf.len() + 10), None);
    }

    #[test]
    fn lines_strip_carriage_returns() {
        let lines = header_lines("GET / HTTP/1.1\r\nA: 1\nB: 2").collect::<Vec<_>>();
        assert_eq!(lines, vec!["GET / HTTP/1.1", "A: 1", "B: 2"]);
    }
}
