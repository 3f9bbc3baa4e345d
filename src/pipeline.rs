//! The five dubbing steps as shown in the process view.

use crate::project::{format::format_percent, Project, ProjectStatus, StepId, StepState, StepStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    pub id: StepId,
    pub name: &'static str,
    pub description: &'static str,
}

pub static STEPS: [StepInfo; 5] = [
    StepInfo {
        id: StepId::SpeechRecognition,
        name: "Speech Recognition",
        description: "Extracting spoken dialogues from the movie",
    },
    StepInfo {
        id: StepId::Translation,
        name: "Translation",
        description: "Translating extracted text from English → Tamil",
    },
    StepInfo {
        id: StepId::VoiceSynthesis,
        name: "Voice Synthesis",
        description: "Generating Tamil audio using the original actor's voice",
    },
    StepInfo {
        id: StepId::LipSync,
        name: "Lip Sync",
        description: "Synchronizing Tamil speech with actor's lip movements",
    },
    StepInfo {
        id: StepId::Processing,
        name: "Video Processing",
        description: "Replacing original audio with the new dubbed voice",
    },
];

pub fn step_info(id: StepId) -> &'static StepInfo {
    STEPS
        .iter()
        .find(|s| s.id == id)
        .unwrap_or(&STEPS[0])
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepView {
    pub info: &'static StepInfo,
    pub state: StepState,
}

impl StepView {
    pub fn label(&self) -> String {
        match self.state.status {
            StepStatus::Completed => "Completed".to_string(),
            StepStatus::InProgress => format_percent(self.state.progress),
            StepStatus::Failed => "Failed".to_string(),
            StepStatus::Waiting => "Waiting".to_string(),
        }
    }
}

/// Everything the process view needs for one project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessView {
    pub steps: Vec<StepView>,
    pub active: StepId,
    pub overall_progress: f32,
    pub playing: bool,
}

impl ProcessView {
    /// Server step map laid over waiting defaults.
    pub fn for_project(project: &Project) -> Self {
        let mut steps: Vec<StepView> = StepId::ALL
            .iter()
            .map(|&id| StepView {
                info: step_info(id),
                state: project
                    .steps
                    .as_ref()
                    .and_then(|map| map.get(&id))
                    .copied()
                    .unwrap_or_default(),
            })
            .collect();

        if project.status == ProjectStatus::Failed {
            for step in steps.iter_mut() {
                if step.state.status == StepStatus::InProgress {
                    step.state.status = StepStatus::Failed;
                }
            }
        }

        let active = steps
            .iter()
            .find(|s| matches!(s.state.status, StepStatus::InProgress | StepStatus::Waiting))
            .or_else(|| steps.last())
            .map(|s| s.info.id)
            .unwrap_or(StepId::SpeechRecognition);

        Self {
            steps,
            active,
            overall_progress: project.progress,
            playing: project.status == ProjectStatus::Processing,
        }
    }

    pub fn active_step(&self) -> &StepView {
        self.steps
            .iter()
            .find(|s| s.info.id == self.active)
            .unwrap_or(&self.steps[0])
    }
}
