//! Vendored and adapted from `path-clean` crate, <https://github.com/danreeves/path-clean>
//!
//! path-clean LICENSE-MIT:
//! Copyright (c) 2018 Dan Reeves
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy
//! of this software and associated documentation files (the "Software"), to deal
//! in the Software without restriction, including without limitation the rights
//! to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//! copies of the Software, and to permit persons to whom the Software is
//! furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all
//! copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//! IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//! AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//! LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//! OUT OF OR IN

use camino::Utf8Component;
use camino::Utf8Path;
use camino::Utf8PathBuf;

/// Lexically normalize `path`, dropping `.` and folding `..` into its parent.
fn clean(path: &Utf8Path) -> Utf8PathBuf {
    let mut out: Vec<Utf8Component<'_>> = Vec::new();

    for comp in path.components() {
        match comp {
            Utf8Component::CurDir => (),
            Utf8Component::ParentDir => match out.last() {
                Some(Utf8Component::RootDir) => (),
                Some(Utf8Component::Normal(_)) => {
                    out.pop();
                }
                None
                | Some(
                    Utf8Component::CurDir | Utf8Component::ParentDir | Utf8Component::Prefix(_),
                ) => {
                    out.push(comp);
                }
            },
            comp => out.push(comp),
        }
    }

    if out.is_empty() {
        Utf8PathBuf::from(".")
    } else {
        out.iter().collect()
    }
}

/// Compute the path of `target` relative to the directory `base`.
///
/// Both paths are cleaned first. The result uses `..` segments to climb out
/// of `base` and is empty when the two paths are the same.
#[must_use]
pub fn relative_path(base: &Utf8Path, target: &Utf8Path) -> Utf8PathBuf {
    let base = clean(base);
    let target = clean(target);

    let base_parts: Vec<_> = base
        .components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect();
    let target_parts: Vec<_> = target
        .components()
        .filter(|c| !matches!(c, Utf8Component::CurDir))
        .collect();

    let common = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = Utf8PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &target_parts[common..] {
        out.push(part.as_str());
    }
    out
}

/// Render a path with forward slashes regardless of platform.
#[must_use]
pub fn to_posix(path: &Utf8Path) -> String {
    path.as_str().replace('\\', "/")
}
