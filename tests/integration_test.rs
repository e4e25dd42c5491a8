/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
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
use std::fs;
use std::process::Command;

/// Keeps the user's own config out of the results.
const CONFIG: &str = "tests/test_data/empty_config.toml";

/// Dynamically collects test cases from a given directory.
fn collect_test_cases(subfolder: &str) -> Vec<(String, String)> {
	let dir_path = format!("tests/test_data/{}", subfolder);

	let mut test_cases = vec![];

	if let Ok(entries) = fs::read_dir(&dir_path) {
		let mut inputs = vec![];
		let mut outputs = vec![];

		for entry in entries.flatten() {
			let file_name =
				entry.file_name().into_string().unwrap_or_default();
			if file_name.ends_with("_in.txt") {
				inputs.push(file_name);
			} else if file_name.ends_with("_out.txt") {
				outputs.push(file_name);
			}
		}

		inputs.sort();
		outputs.sort();

		// Pair inputs with corresponding outputs
		for input_file in inputs {
			let output_file = input_file.replace("_in.txt", "_out.txt");
			if outputs.contains(&output_file) {
				test_cases.push((input_file, output_file));
			}
		}
	}

	assert!(!test_cases.is_empty(), "no test cases in {}", subfolder);
	test_cases
}

#[test]
fn test_integration_daily_json() {
	let test_cases = collect_test_cases("daily");
	execute(
		"daily",
		test_cases,
		true,
		CONFIG,
		"daily",
		vec!["2024-01-02", "--json"],
	);
}

#[test]
fn test_integration_daily_table() {
	let test_cases = collect_test_cases("tables");
	execute("tables", test_cases, true, CONFIG, "daily", vec!["2024-01-02"]);
}

#[test]
fn test_integration_total_json() {
	let test_cases = collect_test_cases("total");
	execute("total", test_cases, true, CONFIG, "total", vec!["--json"]);
}

#[test]
fn test_integration_stock() {
	let test_cases = collect_test_cases("stock");
	execute("stock", test_cases, true, CONFIG, "stock", vec![]);
}

#[test]
fn test_integration_check() {
	let test_cases = collect_test_cases("check");
	execute("check", test_cases, true, CONFIG, "check", vec![]);
}

#[test]
fn test_integration_should_fail() {
	let test_cases = collect_test_cases("failures");
	execute(
		"failures",
		test_cases,
		false,
		CONFIG,
		"daily",
		vec!["2024-01-05"],
	);
}

#[test]
fn test_integration_add_flag() {
	let test_cases = collect_test_cases("add");
	execute("add", test_cases, true, CONFIG, "stock", vec!["-a", "barley"]);
}

#[test]
fn test_integration_config_commodities() {
	let test_cases = collect_test_cases("config");
	execute(
		"config",
		test_cases,
		true,
		"tests/test_data/commodities_config.toml",
		"stock",
		vec!["--add", "barley"],
	);
}

#[test]
fn test_integration_precision_flag() {
	let test_cases = collect_test_cases("precision");
	execute(
		"precision",
		test_cases,
		true,
		CONFIG,
		"daily",
		vec!["2024-01-02", "-p", "1"],
	);
}

#[test]
fn test_integration_bad_flags() {
	let bad_runs = [
		("stock", vec!["-a", "  "]),
		("stock", vec!["-p", "51"]),
		("total", vec!["2024-01-02"]),
	];
	for (cmd, args) in bad_runs {
		let test_cases = collect_test_cases("cli_failures");
		execute("cli_failures", test_cases, false, CONFIG, cmd, args);
	}
}

fn execute(
	subfolder: &str,
	test_cases: Vec<(String, String)>,
	should_succeed: bool,
	config: &str,
	cmd: &str,
	args: Vec<&str>,
) {
	for (input_file, expected_output_file) in test_cases {
		println!("running for {}...", input_file);

		let loc = format!("{}/{}/{}", "tests/test_data", subfolder, input_file);

		let all_args = [
			vec!["run", "--", "-f", loc.as_str(), "--config", config, cmd],
			args.clone(),
		]
		.concat();

		let output = Command::new("cargo")
			.args(all_args)
			.output()
			.expect("Failed to execute process");

		if !should_succeed {
			assert!(
				!output.status.success(),
				"{} unexpectedly succeeded!",
				input_file
			);
			continue;
		}

		assert!(
			output.status.success(),
			"{} failed processing: {}",
			input_file,
			String::from_utf8_lossy(&output.stderr)
		);

		let stdout = String::from_utf8_lossy(&output.stdout);

		let expected_output = fs::read_to_string(format!(
			"{}/{}/{}",
			"tests/test_data", subfolder, expected_output_file
		))
		.expect("Failed to read expected output file");

		assert_eq!(
			stdout.trim(),
			expected_output.trim(),
			"Output did not match for {}; expected:\n{}\ngot:\n{}",
			input_file,
			expected_output.trim(),
			stdout.trim()
		);
	}
}
