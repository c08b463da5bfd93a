pub fn render_schema(vector_dim: u32) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<VECTOR_DIM>", &vector_dim.to_string())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"00_extensions.sql" => out.push_str(include_str!("../../../sql/00_extensions.sql")),
				"tables/001_waitlist.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_waitlist.sql")),
				"tables/002_conversations.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_conversations.sql")),
				"tables/003_messages.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_messages.sql")),
				"tables/004_properties.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_properties.sql")),
				"functions/001_match_properties.sql" =>
					out.push_str(include_str!("../../../sql/functions/001_match_properties.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
