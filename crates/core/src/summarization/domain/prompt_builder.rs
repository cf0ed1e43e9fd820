use super::summary_format::SummaryFormat;

/// Builds the LLM prompt for one summary request.
///
/// `date` is the human-readable meeting date (e.g. "March 14, 2026"),
/// injected by the caller so prompt construction stays deterministic.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(
        format: SummaryFormat,
        transcript: &str,
        duration_minutes: Option<u64>,
        date: &str,
    ) -> String {
        match format {
            SummaryFormat::Detailed => detailed(transcript, duration_minutes, date),
            SummaryFormat::Bullets => bullets(transcript, duration_minutes, date),
            SummaryFormat::Executive => executive(transcript, duration_minutes, date),
            SummaryFormat::Email => email(transcript, duration_minutes, date),
        }
    }
}

fn duration_line(duration_minutes: Option<u64>) -> String {
    match duration_minutes {
        Some(d) => format!("\nMeeting Duration: ~{d} minutes"),
        None => String::new(),
    }
}

fn detailed(transcript: &str, duration_minutes: Option<u64>, date: &str) -> String {
    let duration_text = duration_line(duration_minutes);
    format!(
        "You are an expert meeting assistant. Analyze this meeting transcript and provide a clear, structured summary.\n\
\n\
{duration_text}\n\
\n\
TRANSCRIPT:\n\
{transcript}\n\
\n\
Please provide a professional meeting summary with these sections:\n\
\n\
# Meeting Summary\n\
Date: {date}\n\
\n\
## Overview\n\
[2-3 sentence high-level summary of what was discussed]\n\
\n\
## Key Discussion Points\n\
- [Main topic 1]\n\
- [Main topic 2]\n\
- [Main topic 3]\n\
[etc.]\n\
\n\
## Decisions Made\n\
- [Decision 1]\n\
- [Decision 2]\n\
[If no decisions, write \"No formal decisions recorded\"]\n\
\n\
## Action Items\n\
- [ ] @Person: [Specific task] (Due: [date if mentioned])\n\
- [ ] @Person: [Specific task] (Due: [date if mentioned])\n\
[If no action items, write \"No action items identified\"]\n\
\n\
## Next Steps\n\
- [What happens next]\n\
- [Follow-up items]\n\
\n\
## Open Questions\n\
- [Unresolved question 1]?\n\
- [Unresolved question 2]?\n\
[If none, write \"No open questions\"]\n\
\n\
IMPORTANT RULES:\n\
1. Be concise but complete\n\
2. Extract action items with assignees if names are mentioned\n\
3. Use bullet points for clarity\n\
4. ONLY use information that is explicitly stated in the transcript. NEVER invent names, topics, decisions, or details that are not in the transcript. If a section has no relevant info, write \"Not mentioned in transcript\"\n\
5. Use markdown formatting\n\
6. Keep the tone professional\n\
7. If the transcript is unclear or garbled, summarize only what you can confidently understand\n\
\n\
Generate the summary now:"
    )
}

fn bullets(transcript: &str, duration_minutes: Option<u64>, date: &str) -> String {
    let duration_text = duration_line(duration_minutes);
    format!(
        "You are an expert meeting assistant. Summarize this meeting as a concise bullet-point list.\n\
{duration_text}\n\
\n\
TRANSCRIPT:\n\
{transcript}\n\
\n\
Format your response EXACTLY like this:\n\
\n\
# Meeting Notes - {date}\n\
\n\
## Key Points\n\
- [Point 1]\n\
- [Point 2]\n\
- [Point 3]\n\
\n\
## Action Items\n\
- [ ] [Person]: [Task] [Due date if mentioned]\n\
\n\
## Takeaways\n\
- [Key takeaway 1]\n\
- [Key takeaway 2]\n\
\n\
RULES: Be concise. Max 10 bullet points for Key Points. Only include action items explicitly mentioned. Use markdown."
    )
}

fn executive(transcript: &str, duration_minutes: Option<u64>, date: &str) -> String {
    let duration_text = duration_line(duration_minutes);
    format!(
        "You are an executive assistant. Write a brief executive summary of this meeting in 2-3 paragraphs.\n\
{duration_text}\n\
\n\
TRANSCRIPT:\n\
{transcript}\n\
\n\
Format:\n\
\n\
# Executive Brief - {date}\n\
\n\
[2-3 paragraphs summarizing: what was discussed, what was decided, what happens next]\n\
\n\
**Key Decision:** [Most important decision, or \"None\"]\n\
**Critical Action:** [Most urgent action item, or \"None\"]\n\
\n\
RULES: Keep it under 200 words. No bullet points. Professional tone. Focus on outcomes not process."
    )
}

fn email(transcript: &str, duration_minutes: Option<u64>, date: &str) -> String {
    let duration_text = match duration_minutes {
        Some(d) => format!(" ({d} min)"),
        None => String::new(),
    };
    format!(
        "You are a professional meeting coordinator. Write a follow-up email summarizing this meeting.\n\
\n\
TRANSCRIPT:\n\
{transcript}\n\
\n\
Format the email EXACTLY like this:\n\
\n\
Subject: Meeting Recap - {date}{duration_text}\n\
\n\
Hi team,\n\
\n\
Thank you for joining today's meeting. Here's a quick recap:\n\
\n\
**What we discussed:**\n\
- [Topic 1]\n\
- [Topic 2]\n\
\n\
**What we decided:**\n\
- [Decision 1]\n\
\n\
**Action items:**\n\
- [Person]: [Task] (by [date])\n\
\n\
**Next meeting:** [Date/time if mentioned, otherwise \"TBD\"]\n\
\n\
Let me know if I missed anything or if you have questions.\n\
\n\
Best regards,\n\
[Meeting Organizer]\n\
\n\
RULES: Keep it professional and concise. Only include information from the transcript. Use a warm but professional tone."
    )
}
