//! Server-rendered form page

use minijinja::{Environment, context};
use pulldown_cmark::{Event, Options, Parser, html};
use serde::Serialize;

use crate::controller::Submission;
use crate::models::{Budget, FormInput, TravelStyle, TripDuration};

const INDEX_TEMPLATE: &str = include_str!("index.html");

/// One `<option>` of a select field
#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub key: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[must_use]
pub fn style_options(selected: TravelStyle) -> Vec<SelectOption> {
    TravelStyle::ALL
        .into_iter()
        .map(|style| SelectOption {
            key: style.key(),
            label: style.label(),
            selected: style == selected,
        })
        .collect()
}

#[must_use]
pub fn budget_options(selected: Budget) -> Vec<SelectOption> {
    Budget::ALL
        .into_iter()
        .map(|budget| SelectOption {
            key: budget.key(),
            label: budget.label(),
            selected: budget == selected,
        })
        .collect()
}

/// Markdown to HTML. Raw HTML from the model is shown as text.
#[must_use]
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Renders the form page, with or without a submission outcome
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(
        &self,
        input: &FormInput,
        submission: Option<&Submission>,
    ) -> Result<String, minijinja::Error> {
        let template = self.env.get_template("index.html")?;
        let itinerary_html = submission
            .and_then(Submission::markdown)
            .map(render_markdown);

        template.render(context! {
            input => input,
            min_days => TripDuration::MIN,
            max_days => TripDuration::MAX,
            styles => style_options(input.style),
            budgets => budget_options(input.budget),
            banner => submission.map(|s| &s.banner),
            itinerary_html => itinerary_html,
        })
    }
}
