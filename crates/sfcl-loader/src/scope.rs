use camino::Utf8Path;
use sha2::Digest;
use sha2::Sha256;
use sfcl_source::relative_path;
use sfcl_source::to_posix;

/// Short hex fingerprint of `input`.
#[must_use]
pub fn hash_sum(input: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(input.as_bytes()));
    digest[..8].to_string()
}

/// Path of `resource` relative to `context`, with forward slashes and any
/// leading `../` segments removed.
#[must_use]
pub fn short_file_path(context: &Utf8Path, resource: &Utf8Path) -> String {
    let relative = to_posix(&relative_path(context, resource));
    let mut short = relative.as_str();
    while let Some(rest) = short.strip_prefix("../") {
        short = rest;
    }
    short.to_string()
}

/// Identifier shared by a component's scoped styles and hot-reload record.
///
/// Development builds hash only the short path so the id survives edits;
/// production builds also hash the (line-ending normalized) source.
#[must_use]
pub fn scope_id(short_path: &str, production: bool, source: &str) -> String {
    if production {
        hash_sum(&format!("{short_path}\n{}", source.replace("\r\n", "\n")))
    } else {
        hash_sum(short_path)
    }
}
