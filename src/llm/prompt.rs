//! Prompt construction for project idea generation.

use crate::dialogue::CareerProfile;

/// Instructions describing the JSON object the parser expects
pub const FORMAT_INSTRUCTIONS: &str = r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

Here is the output schema:
```
{"properties": {"project_ideas": {"title": "Project Ideas", "description": "List of project ideas.", "type": "array", "items": {"type": "string"}}}, "required": ["project_ideas"]}
```"#;

/// Build the completion prompt for a finished career profile
pub fn build_project_prompt(profile: &CareerProfile) -> String {
    format!(
        r#"You are The Data Alchemist, a bot for a career growth and acceleration website.
Your job is to generate a list of recommended projects that will lead to career growth,
given a job title, Level, and Industry of the use case.

Output Format:
1. Project 1,
2. Project 2,
3. Project 3,
4. Project 4,
5. Project 5.

{FORMAT_INSTRUCTIONS}

INPUT:
List 5 recommended projects for {job_title}, {level}, {industry}

YOUR RESPONSE:
"#,
        job_title = profile.job_title,
        level = profile.level,
        industry = profile.industry,
    )
}
