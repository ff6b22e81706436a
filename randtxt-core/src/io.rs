use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use crate::text::tag::Tag;

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Reads a tagger output file with one `text<TAB>POS` token per line.
///
/// Lines without a tab, or with an empty text or POS, are skipped.
pub fn read_tsv<P: AsRef<Path>>(path: P) -> io::Result<Vec<Tag>> {
	Ok(read_file(path)?
		.iter()
		.map(|line| parse_line(line))
		.filter(|tag| !tag.text.is_empty() && !tag.pos.is_empty())
		.collect())
}

/// Parses one `text<TAB>POS` line. A line without a tab gives the null tag.
pub fn parse_line(line: &str) -> Tag {
	match line.trim().split_once('\t') {
		Some((text, pos)) => Tag::new(text, pos),
		None => Tag::null(),
	}
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/ion.mkv"` → `"ion"`
/// - `"ion.mkv"` → `"ion"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub fn normalize_folder(input: &str) -> PathBuf {
	if input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_tab_separated_tokens() {
		assert_eq!(parse_line("Ringo\tNNP\n"), Tag::new("Ringo", "NNP"));
		assert_eq!(parse_line(".\t."), Tag::new(".", "."));
		assert!(parse_line("no tab here").is_null());
	}

	#[test]
	fn read_tsv_skips_incomplete_lines() {
		let dir = env::temp_dir().join(format!("randtxt-io-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		let path = dir.join("corpus.tsv");
		fs::write(&path, "The\tDT\r\ndog\tNN\n\tNN\nbarked\t\nnoise\nbarked\tVBD\n.\t.\n").unwrap();

		let tags = read_tsv(&path).unwrap();
		fs::remove_dir_all(&dir).unwrap();

		let grams: Vec<String> = tags.iter().map(Tag::to_string).collect();
		assert_eq!(grams, ["The/DT", "dog/NN", "barked/VBD", "./."]);
	}

	#[test]
	fn filename_without_extension() {
		assert_eq!(get_filename("./data/ion.mkv").unwrap(), "ion");
	}
}
