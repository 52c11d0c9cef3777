//! Prompt templates for planning, reporting and answering.

/// Shown in place of an empty retrieval context.
pub const NO_CONTEXT: &str = "No code found.";

/// Prefix of `text` holding at most `max` chars.
#[must_use]
pub fn clip(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn visited_list(visited: &[String]) -> String {
    if visited.is_empty() {
        "(none)".to_owned()
    } else {
        visited.join(", ")
    }
}

#[must_use]
pub fn planning(file_tree: &str, visited: &[String], knowledge: &str, max_files: usize) -> String {
    format!(
        "You are a source code auditor analyzing the internal implementation of a project.\n\
         \n\
         Rules:\n\
         1. Prioritize source directories such as app/, src/, core/, lib/.\n\
         2. Follow imports: if a file you read imports a local module, read that module next.\n\
         3. Read the README in the first round if one exists.\n\
         \n\
         Project file list:\n\
         {file_tree}\n\
         \n\
         Files already read: {visited}\n\
         \n\
         Knowledge gained so far (imports and definitions):\n\
         {knowledge}\n\
         \n\
         Task: select 1 to {max_files} files to read next, using paths exactly as listed.\n\
         Return ONLY a raw JSON array of strings, for example [\"src/main.py\"].\n\
         Return [] if nothing else is worth reading.",
        visited = visited_list(visited),
    )
}

#[must_use]
pub fn report(visited: &[String], knowledge: &str, budget_chars: usize) -> String {
    format!(
        "You are a tech lead writing an architecture overview.\n\
         \n\
         Files analyzed: {visited}\n\
         \n\
         Code summary (imports and signatures):\n\
         {summary}\n\
         \n\
         Write a technical report in Markdown covering:\n\
         1. Project purpose\n\
         2. Core architecture\n\
         3. Key classes and data flow",
        visited = visited_list(visited),
        summary = clip(knowledge, budget_chars),
    )
}

const ANSWER_RULES: &str = "You are a code expert answering questions about a repository.\n\
     \n\
     Rules:\n\
     1. Answer from the context below.\n\
     2. If the code you need is in the context, answer directly.\n\
     3. If a specific file is missing from the context and you know its path, reply with ONLY this JSON: {\"missing_file\": \"path/to/file\"}\n\
     4. If the user asks to summarize or explain a whole file and the context only shows fragments of it, request the file with the JSON above.";

const ANSWER_RULES_NO_REQUESTS: &str = "You are a code expert answering questions about a repository.\n\
     \n\
     Rules:\n\
     1. Answer from the context below as well as you can.\n\
     2. Do not request additional files. If the context is insufficient, say what is missing.";

#[must_use]
pub fn answer(context: &str, query: &str, allow_file_request: bool) -> String {
    let rules = if allow_file_request {
        ANSWER_RULES
    } else {
        ANSWER_RULES_NO_REQUESTS
    };
    let context = if context.trim().is_empty() {
        NO_CONTEXT
    } else {
        context
    };
    format!("{rules}\n\nContext:\n{context}\n\nUser query: {query}")
}

#[must_use]
pub fn supplemented_answer(path: &str, supplement: &str, context: &str, query: &str) -> String {
    let context = if context.trim().is_empty() {
        NO_CONTEXT
    } else {
        context
    };
    format!(
        "You requested '{path}'. Its content follows.\n\
         Answer the user's question using the updated context. Do not request further files.\n\
         \n\
         New file content:\n\
         {supplement}\n\
         \n\
         Original context:\n\
         {context}\n\
         \n\
         User query: {query}"
    )
}
