use anyhow::Result;
use chrono::NaiveDate;

use fit28_core::coach::Topic;
use fit28_core::service::Tracker;

pub(crate) fn cmd_coach(
    tracker: &Tracker,
    topic: Option<&str>,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let topic: Option<Topic> = topic.map(str::parse).transpose()?;
    let reply = tracker.suggest(topic, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        if let Some(question) = reply.question {
            println!("You:   {question}");
        }
        println!("Coach: {}", reply.answer);
    }
    Ok(())
}
