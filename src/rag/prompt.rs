// Classification prompt template

/// Placeholder replaced by the assembled context
pub const CONTEXT_SLOT: &str = "{context}";

/// Placeholder replaced by the user's complaint text
pub const QUESTION_SLOT: &str = "{question}";

/// Instruction template sent to the chat model. Kept byte-for-byte stable:
/// downstream parsing expects the `- L1:` / `- L2:` / `- L3:` list it asks for.
pub const PROMPT_TEMPLATE: &str = "Based solely on the following context, output the corresponding Reported Problem Code L1, Reported Problem Code L2, and Reported Problem Code L3 values.
IMPORTANT:
- Do not mix and match the error codes, a given short description will have the same L1, L2 and L3 mappings
- Just choose one from the following context. Do not change the wordings in L1, L2, L3, return it as it is.
- The context will always be a set of L1, L2, L3 codes and the question will be based on that context
- If it is polar opposite of the context, then just answer Non complaint for L1, L2, L3

Context:
{context}

Question:
{question}

Output one of the set of L1, L2, L3 codes that is provided as context, choose one which is most suitable set for the given question.
Note that the set of L1, L2 and L3 will be same for a given short description.

Output in list format, each in newline like
- L1: <L1 description>
- L2: <L2 description>
- L3: <L3 description>
";

/// Fill the template in a single pass.
///
/// Placeholder-like text inside `context` or `question` is inserted
/// literally, never substituted again.
pub fn render_prompt(context: &str, question: &str) -> String {
    let mut out = String::with_capacity(PROMPT_TEMPLATE.len() + context.len() + question.len());
    let mut rest = PROMPT_TEMPLATE;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(CONTEXT_SLOT) {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(QUESTION_SLOT) {
            out.push_str(question);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);

    out
}
