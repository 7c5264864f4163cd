// Prompt text for the CV optimizer.
// The sanitizer re-applies the formatting rules to whatever comes back.

/// System prompt: the formatting contract the model must honour.
pub const OPTIMIZE_SYSTEM: &str = "You are a professional CV optimizer. \
    Rewrite the CV so it reads well for the job description while keeping every \
    original fact: names, dates, job titles, employers and locations must appear \
    exactly as given. Do not invent experience. \
    Structure the result into sections such as PROFESSIONAL SUMMARY, TECHNICAL SKILLS, \
    PROFESSIONAL EXPERIENCE and EDUCATION. Section headers are written in UPPER CASE \
    on their own line, with one blank line before each header. \
    The first lines are the candidate's name followed by contact details. \
    List items start with the bullet character \u{2022} followed by a space. \
    Return only the CV text. Do not add any introduction, commentary or closing remarks.";

/// User prompt embedding the job description and the CV text.
pub fn optimize_user_prompt(cv_text: &str, job_description: &str) -> String {
    format!(
        "Optimize and structure this CV for the following job description.\n\n\
         JOB DESCRIPTION:\n{job_description}\n\n\
         CV CONTENT:\n{cv_text}"
    )
}
