/*!
 * Prompt templates for the analysis, transcription and guide stages.
 *
 * Templates use `{placeholder}` markers filled in by `PromptTemplate::render`.
 */

/// A prompt template with named placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// Standalone analysis of a text or PDF document
    pub const DOCUMENT_ANALYSIS: &'static str = r#"Act as an expert content analyst. Examine the file provided below, work out what it describes (its logic, functionality and flow), and explain it clearly.

Structure the explanation as a step-by-step sequence. For each step, describe what happens, why it happens, and any detail needed to understand it fully, so the reader can follow each point on its own and the file as a whole.

File content:
{file_content}
"#;

    /// Joint analysis of every COBOL source of a program
    pub const PROGRAM_ANALYSIS: &'static str = r#"Act as an expert COBOL program analyst. You are given the content of several COBOL source files that make up one program or a set of related modules. Analyse them as a single unit.

Identify and explain:
1. Overall purpose: what the files achieve together.
2. Inter-file connections: CALL statements, shared data structures, copybooks, external dependencies, entry points and the order in which modules run.
3. Shared variables and data flow: records passed through LINKAGE SECTION or COPY members, and how critical data moves between modules.
4. Module responsibilities: the role of each file within the program.
5. Issues and insights: complex interactions, optimization opportunities, recurring COBOL patterns.

Reference file names wherever a connection or responsibility is identified.

COBOL program files (each file is delimited):
{combined_cobol_content}
"#;

    /// COBOL to target-language migration of one source
    pub const TRANSCRIPTION: &'static str = r#"Migrate the provided COBOL code to {target_language}.
Provide only the migrated code in {target_language}, without additional explanations.

COBOL code:
{file_content}
"#;

    /// Integration guide for one migrated source
    pub const INTEGRATION_GUIDE: &'static str = r#"You are an expert software architect and migration specialist.
The following COBOL program has been migrated to {target_language}. Write a step-by-step guide for integrating and applying this code in a typical {target_language} application.

Cover:
1. Dependencies and prerequisites: libraries, frameworks, runtime versions.
2. Project structure: where the code should live (folders, namespaces, packages).
3. Integration steps: how other parts of the application call it, how to run it standalone, input/output handling and data type conversions.
4. Testing and verification: key areas to test, unit and integration test approaches.
5. Best practices: {target_language} idioms to apply, pitfalls, performance, error handling and logging.
6. Usage example: a short {target_language} snippet showing how to use the migrated code.

Assume the reader has basic knowledge of {target_language}.

Migrated {target_language} code:
{migrated_code_content}
"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn document_analysis() -> Self {
        Self::new(Self::DOCUMENT_ANALYSIS)
    }

    pub fn program_analysis() -> Self {
        Self::new(Self::PROGRAM_ANALYSIS)
    }

    pub fn transcription() -> Self {
        Self::new(Self::TRANSCRIPTION)
    }

    pub fn integration_guide() -> Self {
        Self::new(Self::INTEGRATION_GUIDE)
    }

    /// Render the template, replacing each `{key}` with its value
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        vars.iter().fold(self.template.clone(), |acc, (key, value)| {
            acc.replace(&format!("{{{}}}", key), value)
        })
    }
}

/// Concatenate COBOL sources with start/end markers for the program analysis
pub fn combine_sources<'a, I>(sources: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut combined = String::new();
    for (name, text) in sources {
        combined.push_str(&format!("--- Start File: {} ---\n", name));
        combined.push_str(text);
        combined.push_str(&format!("\n--- End File: {} ---\n\n", name));
    }
    combined
}
