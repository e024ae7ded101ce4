use super::{
    DeadlineDetection, DetectDeadlineInput, GenerateScheduleInput, GeneratedSchedule,
    PromptTemplate, ReminderSuggestion, SuggestRemindersInput,
};

pub(super) static DETECT_DEADLINE: PromptTemplate<DetectDeadlineInput, DeadlineDetection> =
    PromptTemplate::new(
        "detect_deadline",
        r#"You are an assistant that analyzes text to detect deadlines, appointments, and payment reminders.

Determine whether the provided text contains a deadline, appointment, or payment reminder. If so, extract the relevant information. If not, set shouldAdd to false and omit the other fields.

When extracting the date, also extract the time if it is present and include it in ISO format (YYYY-MM-DDTHH:mm:ss.sssZ). If no time is specified, use the beginning of the day (00:00:00).
The current year is {{year}}.

Text: {{text}}

Respond with a JSON object of the shape:
{"shouldAdd": boolean, "title": string, "date": string, "category": one of "Assignment", "Meeting", "Bill", "Personal", "Work", "Exam"}"#,
    );

pub(super) static SUGGEST_REMINDERS: PromptTemplate<SuggestRemindersInput, ReminderSuggestion> =
    PromptTemplate::new(
        "suggest_reminders",
        r#"You are an assistant that suggests reminder times for tasks and events.

Based on the title and due date, judge the importance and nature of the item.
- For critical items like an exam or project deadline, suggest multiple reminders (for example 1 day before and 2 hours before).
- For less critical items like a meeting, a single reminder (for example 30 minutes before) is enough.
- For bills, suggest a reminder a few days in advance.

Always return at least one reminder and never more than 3.

Current time is {{now}}.
Task title: {{title}}
Due date: {{date}}

Respond with a JSON object of the shape:
{"reminders": [{"value": positive integer, "unit": "minutes" | "hours" | "days"}]}"#,
    );

pub(super) static GENERATE_SCHEDULE: PromptTemplate<GenerateScheduleInput, GeneratedSchedule> =
    PromptTemplate::new(
        "generate_schedule",
        r#"You are an assistant that creates study schedules for students.

Based on the request below about assignments, deadlines, and available study time, write a clear, actionable study plan. Prioritize by urgency and importance and break large tasks into smaller steps.

Format the plan as a small HTML fragment using only <p>, <ul>, <li>, <b> and <br> tags. Do not include <html>, <body>, <head> or any other tag.

Request: {{query}}

The current date is {{today}}.

Respond with a JSON object of the shape:
{"schedule": string}"#,
    );
