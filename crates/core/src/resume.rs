//! Plain-text resume parsing and the deterministic question fallback.
//!
//! Document extraction (PDF/DOCX) is a collaborator concern; the core
//! only understands already-extracted text, split into sections by
//! header lines. The fallback synthesizer turns those sections into a
//! usable question set whenever the generator collaborator fails or
//! returns nothing.

use crate::bank::{Difficulty, GeneratedQuestion, QuestionKind, ResumeQuestionSet};

/// Structured resume content the generator and fallback both consume.
#[derive(Debug, Clone, Default)]
pub struct ResumeProfile {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub skills: Vec<String>,
    pub projects: Vec<String>,
    pub experience: Vec<String>,
    pub internships: Vec<String>,
}

impl ResumeProfile {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.projects.is_empty()
            && self.experience.is_empty()
            && self.internships.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Summary,
    Skills,
    Projects,
    Experience,
    Internships,
    Ignored,
}

fn classify_header(line: &str) -> Option<Section> {
    let header = line.trim().trim_end_matches(':').to_lowercase();
    let section = match header.as_str() {
        "summary" | "objective" | "profile" | "about me" | "professional summary" => {
            Section::Summary
        }
        "skills" | "technical skills" | "technologies" | "tech stack" | "tools"
        | "expertise" => Section::Skills,
        "projects" | "personal projects" | "academic projects" | "key projects"
        | "portfolio" => Section::Projects,
        "experience" | "work experience" | "professional experience" | "employment"
        | "employment history" | "work history" | "career" => Section::Experience,
        "internships" | "internship" | "training" | "industrial training"
        | "summer training" => Section::Internships,
        "education" | "certifications" | "achievements" | "awards" | "hobbies"
        | "interests" | "leadership" => Section::Ignored,
        _ => return None,
    };
    Some(section)
}

/// Parse already-extracted resume text into a profile. Section headers
/// are matched on their own line; skills split on the usual delimiter
/// characters, other sections keep one entry per bullet/line.
pub fn parse_resume_text(text: &str) -> ResumeProfile {
    let mut profile = ResumeProfile::default();
    let mut current = Section::None;
    let mut summary_lines: Vec<String> = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim().trim_start_matches(['-', '*', '•']).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(section) = classify_header(raw_line) {
            current = section;
            continue;
        }
        match current {
            Section::None => {
                // First non-header line is taken as the candidate name.
                if profile.name.is_none() && line.split_whitespace().count() <= 5 {
                    profile.name = Some(line.to_string());
                }
            }
            Section::Summary => summary_lines.push(line.to_string()),
            Section::Skills => {
                for skill in line.split([',', '|', ';', '•', '·']) {
                    let skill = skill.trim();
                    if !skill.is_empty() && !profile.skills.iter().any(|s| s == skill) {
                        profile.skills.push(skill.to_string());
                    }
                }
            }
            Section::Projects => profile.projects.push(line.to_string()),
            Section::Experience => profile.experience.push(line.to_string()),
            Section::Internships => profile.internships.push(line.to_string()),
            Section::Ignored => {}
        }
    }

    if !summary_lines.is_empty() {
        profile.summary = Some(summary_lines.join(" "));
    }
    profile
}

/// Truncate an entry to a speakable name, cutting at the first period.
fn entry_name(entry: &str) -> String {
    let head = entry.split('.').next().unwrap_or(entry).trim();
    head.chars().take(50).collect()
}

const FALLBACK_CAP: usize = 18;

/// Deterministic question synthesis from parsed resume sections, used
/// when the generator collaborator is unavailable or returns nothing.
pub fn synthesize_fallback(profile: &ResumeProfile) -> ResumeQuestionSet {
    let mut questions = Vec::new();

    for skill in profile.skills.iter().take(5) {
        questions.push(GeneratedQuestion {
            question: format!(
                "You listed {skill} in your resume. Can you walk me through a specific project \
                 where you applied {skill} and what challenges you faced?"
            ),
            expected_answer: format!(
                "Should describe practical experience with {skill}, specific use cases and challenges"
            ),
            kind: QuestionKind::Theoretical,
            difficulty: Difficulty::Medium,
            section: "skills".to_string(),
            keywords: vec![skill.clone()],
        });
    }

    for project in profile.projects.iter().take(3) {
        let name = entry_name(project);
        questions.push(GeneratedQuestion {
            question: format!(
                "In your {name} project, what was the most technically challenging problem you \
                 solved? Walk me through your approach."
            ),
            expected_answer:
                "Should discuss technical challenges, decision-making process, and solutions"
                    .to_string(),
            kind: QuestionKind::Project,
            difficulty: Difficulty::Medium,
            section: "projects".to_string(),
            keywords: vec![],
        });
    }

    for role in profile.experience.iter().take(2) {
        let name = entry_name(role);
        questions.push(GeneratedQuestion {
            question: format!(
                "At {name}, what was a specific technical decision you made that had significant \
                 impact? Why did you choose that approach?"
            ),
            expected_answer:
                "Should describe specific decision, alternatives considered, and measurable impact"
                    .to_string(),
            kind: QuestionKind::Experience,
            difficulty: Difficulty::Easy,
            section: "experience".to_string(),
            keywords: vec![],
        });
    }

    for internship in profile.internships.iter().take(2) {
        let name = entry_name(internship);
        questions.push(GeneratedQuestion {
            question: format!(
                "During your {name} internship, what was the biggest thing you learned that you \
                 couldn't have learned in a classroom?"
            ),
            expected_answer:
                "Should describe practical learnings, real-world exposure, and growth".to_string(),
            kind: QuestionKind::Behavioral,
            difficulty: Difficulty::Easy,
            section: "internships".to_string(),
            keywords: vec![],
        });
    }

    if profile.skills.len() >= 2 {
        let first = &profile.skills[0];
        let second = &profile.skills[1];
        questions.push(GeneratedQuestion {
            question: format!(
                "Given your experience with {first} and {second}, how would you design a system \
                 that needs to handle 1 million requests per day?"
            ),
            expected_answer:
                "Should demonstrate system design thinking, scalability considerations".to_string(),
            kind: QuestionKind::Scenario,
            difficulty: Difficulty::Hard,
            section: "skills".to_string(),
            keywords: vec![first.clone(), second.clone()],
        });
    }

    questions.truncate(FALLBACK_CAP);
    ResumeQuestionSet {
        summary: "Fallback questions synthesized from parsed resume sections".to_string(),
        questions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Jane Doe
jane@example.com

Summary
Backend engineer with five years of distributed systems work.

Skills
Rust, Go | PostgreSQL; Kafka

Projects
- Billing pipeline. Rebuilt invoice processing on a streaming backbone.
- Search relevance service.

Experience
- Acme Corp. Senior engineer on the payments team.

Internships
- DataWorks. Summer ETL tooling.
";

    #[test]
    fn parses_sections_and_splits_skills() {
        let profile = parse_resume_text(SAMPLE);
        assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
        assert_eq!(profile.skills, vec!["Rust", "Go", "PostgreSQL", "Kafka"]);
        assert_eq!(profile.projects.len(), 2);
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.internships.len(), 1);
        assert!(profile
            .summary
            .as_deref()
            .unwrap()
            .contains("distributed systems"));
    }

    #[test]
    fn fallback_covers_every_populated_section() {
        let profile = parse_resume_text(SAMPLE);
        let set = synthesize_fallback(&profile);
        // 4 skills + 2 projects + 1 experience + 1 internship + 1 scenario
        assert_eq!(set.questions.len(), 9);
        assert!(set
            .questions
            .iter()
            .any(|q| q.kind == QuestionKind::Scenario && q.difficulty == Difficulty::Hard));
        assert!(set.questions.iter().any(|q| q.question.contains("Rust")));
        assert!(set
            .questions
            .iter()
            .any(|q| q.question.contains("Billing pipeline")));
    }

    #[test]
    fn fallback_on_empty_profile_yields_no_questions() {
        let set = synthesize_fallback(&ResumeProfile::default());
        assert!(set.questions.is_empty());
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let profile = parse_resume_text("John\n\nEducation\nB.Tech somewhere\n\nSkills\nPython");
        assert_eq!(profile.skills, vec!["Python"]);
        assert!(profile.projects.is_empty());
    }
}
