use crate::error::ActuationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// Idle motion is enabled.
    #[default]
    Idle,
    /// Idle motion is disabled while qualifying frames keep arriving.
    Responding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseSlot {
    #[default]
    Free,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    pub state: ControllerState,
    pub response: ResponseSlot,
    pub responses_issued: u64,
    pub last_failure: Option<ActuationError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    FrameClassified { frame_index: u64, qualifies: bool },
    ResponseDone(Result<(), ActuationError>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    EnableIdleMotion,
    DisableIdleMotion,
    DrawResponse,
}

pub fn init() -> (Model, Vec<Effect>) {
    (Model::default(), vec![Effect::EnableIdleMotion])
}

/// Claims the response slot if it is free. A qualifying frame that arrives
/// while a response is still being drawn is coalesced into it.
fn draw_response_if_free(model: &mut Model, effects: &mut Vec<Effect>) {
    if model.response == ResponseSlot::Free {
        model.response = ResponseSlot::InFlight;
        model.responses_issued += 1;
        effects.push(Effect::DrawResponse);
    }
}

pub fn transition(model: Model, event: Event) -> (Model, Vec<Effect>) {
    let mut next = model.clone();
    let mut effects = vec![];

    match (model.state, event) {
        (ControllerState::Idle, Event::FrameClassified { qualifies: false, .. }) => {}
        (ControllerState::Idle, Event::FrameClassified { qualifies: true, .. }) => {
            next.state = ControllerState::Responding;
            effects.push(Effect::DisableIdleMotion);
            draw_response_if_free(&mut next, &mut effects);
        }
        (ControllerState::Responding, Event::FrameClassified { qualifies: true, .. }) => {
            draw_response_if_free(&mut next, &mut effects);
        }
        (ControllerState::Responding, Event::FrameClassified { qualifies: false, .. }) => {
            next.state = ControllerState::Idle;
            effects.push(Effect::EnableIdleMotion);
        }
        (_, Event::ResponseDone(Ok(()))) => {
            next.response = ResponseSlot::Free;
        }
        (state, Event::ResponseDone(Err(error))) => {
            next.response = ResponseSlot::Free;
            next.last_failure = Some(error);
            if state == ControllerState::Responding {
                next.state = ControllerState::Idle;
                effects.push(Effect::EnableIdleMotion);
            }
        }
    }

    (next, effects)
}
