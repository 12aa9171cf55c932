//! Server-rendered screens. Each one is built from the data of a single request.

use crate::domain::lists::{ListWithTasks, Subtask, Task, subtask_percentage};
use crate::domain::owner::OwnerSettings;
use crate::domain::public::{PublicListing, TaskDetail};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

const APP_NAME: &str = "Publists";

/// Posts the whole checkbox state to `/update` and reports the outcome for two seconds
const SETTINGS_SCRIPT: &str = r#"<script>
document.getElementById('save').addEventListener('click', async () => {
  const message = document.getElementById('message');
  message.textContent = '';
  const publicLists = {};
  document.querySelectorAll('input[data-list-id]').forEach((box) => {
    publicLists[box.dataset.listId] = box.checked;
  });
  const response = await fetch('/update', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ public_lists: publicLists }),
  });
  if (response.ok) {
    message.textContent = 'Saved!';
    setTimeout(() => { message.textContent = ''; }, 2000);
  } else {
    const body = await response.json().catch(() => ({}));
    message.textContent = `Error (${response.status}): ${body.error_description || body.message || response.statusText}`;
  }
});
</script>"#;

pub fn title_maker(page: &str) -> String {
    format!("{page} - {APP_NAME}")
}

fn layout(title: Option<&str>, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n\
         <nav><a href=\"/\">{APP_NAME}</a> | <a href=\"/faq\">FAQ</a></nav>\n{body}\n</body>\n</html>\n",
        text(title.unwrap_or(APP_NAME)),
    )
}

/// "2/3 subtasks done (66.67%)", or nothing when there are no subtasks to measure
pub fn progress_label(subtasks: &[Subtask]) -> Option<String> {
    let percentage = subtask_percentage(subtasks);
    if percentage.is_nan() {
        return None;
    }

    let done = subtasks.iter().filter(|subtask| subtask.completed).count();
    Some(format!(
        "{done}/{} subtasks done ({percentage:.2}%)",
        subtasks.len()
    ))
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

pub fn landing_page() -> String {
    layout(
        None,
        "<h1>Publists</h1>\n<p>Share your Wunderlist lists with anyone, read-only.</p>\n\
         <p><a href=\"/login\">Log in with Wunderlist</a></p>",
    )
}

pub fn faq_page() -> String {
    layout(
        Some(&title_maker("FAQs")),
        "<h1>FAQs</h1>\n<dl>\n\
         <dt>Who can see my lists?</dt><dd>Only the lists you tick on your settings page, and only read-only.</dd>\n\
         <dt>What do you store?</dt><dd>Your Wunderlist id, name and access token, plus which lists are public.</dd>\n\
         <dt>How do I hide a list again?</dt><dd>Untick it and save. It disappears right away.</dd>\n\
         </dl>",
    )
}

/// The owner's settings screen. `settings` is [None] when their lists couldn't be loaded.
pub fn settings_page(name: &str, wid: &str, settings: Option<&OwnerSettings>) -> String {
    let mut body = format!(
        "<h1>Hi, {}</h1>\n<p><a href=\"/user/{}/lists\">Your public page</a> | <a href=\"/logout\">Log out</a></p>\n",
        text(name),
        attr(wid),
    );

    let Some(settings) = settings else {
        body.push_str("<p class=\"error\">Your lists couldn't be loaded from Wunderlist. Try again later.</p>");
        return layout(Some(&title_maker("Settings")), &body);
    };

    body.push_str("<ul>\n");
    for list in &settings.lists {
        let list_id = list.id.to_string();
        let public = settings.public_lists.get(&list_id).copied().unwrap_or(false);
        let _ = writeln!(
            body,
            "<li><label><input type=\"checkbox\" data-list-id=\"{}\"{}> {}</label></li>",
            attr(&list_id),
            if public { " checked" } else { "" },
            text(&list.title),
        );
    }
    body.push_str("</ul>\n<button id=\"save\">Save</button> <span id=\"message\"></span>\n");
    body.push_str(SETTINGS_SCRIPT);

    layout(Some(&title_maker("Settings")), &body)
}

pub fn lists_page(wid: &str, listing: &PublicListing) -> String {
    let mut body = format!("<h1>{}'s Public Lists</h1>\n", text(&listing.name));

    if listing.lists.is_empty() {
        body.push_str("<p>Nothing has been shared yet.</p>");
    } else {
        body.push_str("<ul>\n");
        for list in &listing.lists {
            let _ = writeln!(
                body,
                "<li><a href=\"/user/{}/lists/{}\">{}</a></li>",
                attr(wid),
                list.id,
                text(&list.title),
            );
        }
        body.push_str("</ul>");
    }

    layout(
        Some(&title_maker(&format!("{}'s Public Lists", listing.name))),
        &body,
    )
}

fn task_line(wid: &str, task: &Task) -> String {
    let mut line = format!(
        "<li>{} <a href=\"/user/{}/lists/{}/task/{}\">{}</a>",
        checkbox(task.completed),
        attr(wid),
        task.list_id,
        task.id,
        text(&task.title),
    );
    if task.starred {
        line.push_str(" &#9733;");
    }
    if let Some(label) = task.subtasks.as_deref().and_then(progress_label) {
        let _ = write!(line, " <small>{}</small>", text(&label));
    }
    line.push_str("</li>");
    line
}

pub fn list_page(wid: &str, owner_name: &str, list_with_tasks: &ListWithTasks) -> String {
    let list = &list_with_tasks.list;
    let mut body = format!("<h1>{}</h1>\n", text(&list.title));

    if list_with_tasks.tasks.is_empty() {
        body.push_str("<p>This list is empty.</p>");
    } else {
        body.push_str("<ul>\n");
        for task in &list_with_tasks.tasks {
            body.push_str(&task_line(wid, task));
            body.push('\n');
        }
        body.push_str("</ul>");
    }
    let _ = write!(
        body,
        "\n<p><a href=\"/user/{}/lists\">All of {}'s public lists</a></p>",
        attr(wid),
        text(owner_name),
    );

    layout(
        Some(&title_maker(&format!("{owner_name}'s List - {}", list.title))),
        &body,
    )
}

pub fn task_page(wid: &str, detail: &TaskDetail) -> String {
    let task = &detail.task;
    let mut body = format!(
        "<h1>{} {}</h1>\n<p>On <a href=\"/user/{}/lists/{}\">{}</a></p>\n",
        checkbox(task.completed),
        text(&task.title),
        attr(wid),
        detail.list.id,
        text(&detail.list.title),
    );

    if let Some(due_date) = &task.due_date {
        let _ = writeln!(body, "<p>Due {}</p>", text(due_date));
    }
    if let Some(note) = &task.note {
        let _ = writeln!(body, "<blockquote>{}</blockquote>", text(note));
    }

    let subtasks = task.subtasks.as_deref().unwrap_or_default();
    match progress_label(subtasks) {
        Some(label) => {
            let _ = writeln!(body, "<p>{}</p>\n<ul>", text(&label));
            for subtask in subtasks {
                let _ = writeln!(
                    body,
                    "<li>{} {}</li>",
                    checkbox(subtask.completed),
                    text(&subtask.title),
                );
            }
            body.push_str("</ul>");
        }
        None => body.push_str("<p>No subtasks.</p>"),
    }

    layout(
        Some(&title_maker(&format!("{} - Task", detail.list.title))),
        &body,
    )
}
