/* Copyright © 2024-2025 Adam Train <adam@adamtrain.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::config::config_file::Config;
use anyhow::{anyhow, bail, Error};
use dirs::home_dir;
use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct Filesystem {
	/// Set of file paths that have been inspected.
	/// Used to avoid circular includes.
	included_files: HashSet<String>,
}

impl Filesystem {
	pub fn new() -> Self {
		Self {
			included_files: HashSet::new(),
		}
	}

	pub fn open(&self, file_path: &str) -> Result<File, Error> {
		let path = Path::new(file_path);
		File::open(path).map_err(|e| anyhow!("{}: {}", file_path, e))
	}

	pub fn declare_file(&mut self, file_path: &str) -> Result<(), Error> {
		if !self.included_files.insert(file_path.to_string()) {
			bail!("Circular file includes: {}", file_path)
		}
		Ok(())
	}

	/// Fetches the config from the given path, or the default path if none.
	/// A missing file at the default path just means an empty config; a
	/// missing file at a path the user asked for is an error.
	pub fn get_config(
		&self,
		custom_config_path: Option<&String>,
	) -> Result<Config, Error> {
		let config_path = match custom_config_path {
			Some(p) => PathBuf::from(p),
			None => match Filesystem::default_config_path() {
				Some(p) if p.exists() => p,
				_ => return Ok(Config::default()),
			},
		};

		let content = fs::read_to_string(&config_path).map_err(|e| {
			anyhow!("failed to read config {}: {}", config_path.display(), e)
		})?;

		toml::from_str(&content)
			.map_err(|e| anyhow!("failed to parse config: {}", e))
	}

	fn default_config_path() -> Option<PathBuf> {
		home_dir().map(|home| home.join(".config/cropledr/config.toml"))
	}
}
