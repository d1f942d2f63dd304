//! Scripted coach: canned replies chosen from today's protein intake and the
//! saved goal.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::Serialize;

use crate::food::PROTEIN_TARGET_G;
use crate::goals::{DEFAULT_GOAL, GoalPreset};

pub const GREETING: &str =
    "I'm here to help with your fitness journey! Ask me about food, workouts, or protein intake.";

const LOW_PROTEIN_G: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Food,
    Workout,
    Protein,
}

impl Topic {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Workout => "workout",
            Self::Protein => "protein",
        }
    }

    /// The question the user asks for this topic.
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Food => "Any suggestions for food today?",
            Self::Workout => "What's a good workout for me today?",
            Self::Protein => "How am I doing on protein today?",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "workout" => Ok(Self::Workout),
            "protein" => Ok(Self::Protein),
            _ => bail!("Unknown topic '{s}'. Ask about food, workout, or protein"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<Topic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<&'static str>,
    pub answer: String,
}

/// Reply for `topic` given today's protein total and the saved goal's
/// `specific` field. With no topic, the greeting.
#[must_use]
pub fn respond(topic: Option<Topic>, protein_today: f64, goal: Option<&str>) -> Exchange {
    let answer = match topic {
        None => GREETING.to_string(),
        Some(Topic::Food) => food_reply(protein_today).to_string(),
        Some(Topic::Workout) => workout_reply(goal.unwrap_or(DEFAULT_GOAL)).to_string(),
        Some(Topic::Protein) => protein_reply(protein_today),
    };
    Exchange {
        topic,
        question: topic.map(Topic::prompt),
        answer,
    }
}

fn food_reply(protein_today: f64) -> &'static str {
    if protein_today < LOW_PROTEIN_G {
        "Based on your intake today, you're low on protein. I suggest grilled chicken breast (30g protein) or Greek yogurt (20g protein) for your next meal."
    } else {
        "Your protein intake looks good! For balance, consider adding some complex carbs like brown rice or quinoa with vegetables."
    }
}

fn workout_reply(goal: &str) -> &'static str {
    match GoalPreset::from_specific(goal) {
        GoalPreset::BuildMuscle => {
            "For muscle building, try: 3 sets of 8-12 reps for: Squats, Bench Press, Rows, and Overhead Press. Rest 60-90 seconds between sets."
        }
        GoalPreset::LoseFat => {
            "For fat loss, try this HIIT workout: 30 seconds work, 30 seconds rest for: Jumping Jacks, Mountain Climbers, High Knees, and Burpees. Repeat 4 times."
        }
        GoalPreset::ImproveEndurance | GoalPreset::General => {
            "For general fitness, try: 30 minutes of moderate cardio followed by bodyweight exercises: Push-ups, Squats, Planks, and Lunges."
        }
    }
}

/// Percent of the protein target, rounded half up.
#[must_use]
pub fn protein_percentage(protein_today: f64) -> i64 {
    (protein_today / PROTEIN_TARGET_G * 100.0 + 0.5).floor() as i64
}

fn protein_reply(protein_today: f64) -> String {
    let pct = protein_percentage(protein_today);
    if pct < 50 {
        let remaining = PROTEIN_TARGET_G - protein_today;
        format!(
            "You've consumed {protein_today}g protein ({pct}% of target). You need {remaining}g more. Focus on high-protein foods like chicken, fish, eggs, or protein shakes."
        )
    } else if pct < 80 {
        format!(
            "Good progress! {protein_today}g protein ({pct}% of target). You're on track. Consider a protein-rich snack to reach your goal."
        )
    } else {
        format!(
            "Excellent! {protein_today}g protein ({pct}% of target). You're meeting your protein needs for muscle recovery and growth."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_threshold() {
        let low = respond(Some(Topic::Food), 49.9, None);
        assert!(low.answer.contains("low on protein"));
        let ok = respond(Some(Topic::Food), 50.0, None);
        assert!(ok.answer.contains("looks good"));
        assert_eq!(ok.question, Some("Any suggestions for food today?"));
    }

    #[test]
    fn test_workout_by_goal() {
        assert!(
            respond(Some(Topic::Workout), 0.0, Some("build muscle"))
                .answer
                .starts_with("For muscle building")
        );
        assert!(
            respond(Some(Topic::Workout), 0.0, Some("lose fat"))
                .answer
                .starts_with("For fat loss")
        );
        assert!(
            respond(Some(Topic::Workout), 0.0, None)
                .answer
                .starts_with("For general fitness")
        );
        assert!(
            respond(Some(Topic::Workout), 0.0, Some("improve endurance"))
                .answer
                .starts_with("For general fitness")
        );
    }

    #[test]
    fn test_workout_goal_matches_like_presets() {
        for goal in ["Build Muscle", "  BUILD muscle "] {
            assert!(
                respond(Some(Topic::Workout), 0.0, Some(goal))
                    .answer
                    .starts_with("For muscle building")
            );
        }
        assert!(
            respond(Some(Topic::Workout), 0.0, Some("Lose Fat"))
                .answer
                .starts_with("For fat loss")
        );
    }

    #[test]
    fn test_protein_bands() {
        let behind = respond(Some(Topic::Protein), 42.0, None).answer;
        assert_eq!(
            behind,
            "You've consumed 42g protein (30% of target). You need 98g more. Focus on high-protein foods like chicken, fish, eggs, or protein shakes."
        );

        let progress = respond(Some(Topic::Protein), 84.0, None).answer;
        assert!(progress.starts_with("Good progress! 84g protein (60% of target)."));

        let done = respond(Some(Topic::Protein), 112.0, None).answer;
        assert!(done.starts_with("Excellent! 112g protein (80% of target)."));
    }

    #[test]
    fn test_protein_percentage_rounding() {
        assert_eq!(protein_percentage(0.0), 0);
        assert_eq!(protein_percentage(69.0), 49);
        assert_eq!(protein_percentage(70.0), 50);
        assert_eq!(protein_percentage(280.0), 200);
    }

    #[test]
    fn test_greeting_without_topic() {
        let reply = respond(None, 0.0, None);
        assert_eq!(reply.answer, GREETING);
        assert!(reply.question.is_none());
    }

    #[test]
    fn test_topic_parse() {
        assert_eq!("Protein".parse::<Topic>().unwrap(), Topic::Protein);
        assert!("sleep".parse::<Topic>().is_err());
    }
}
