//! Agent profiles
//!
//! The three actors responsible for the pipeline stages. A profile becomes
//! the engine's system instruction for the stage it owns.

/// Role, goal and backstory of an actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    /// Short role title
    pub role: &'static str,
    /// What the actor tries to achieve
    pub goal: &'static str,
    /// Background that shapes how it works
    pub backstory: &'static str,
}

impl AgentProfile {
    /// Render the profile as a system instruction
    pub fn system_instruction(&self) -> String {
        format!(
            "You are {}.\n{}\n\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

/// Gathers flights, lodging and other essentials for the destination
pub const TRAVEL_EXPERT: AgentProfile = AgentProfile {
    role: "a travel expert",
    goal: "Collect up-to-date, useful information about the destination and provide it to the traveler.",
    backstory: "You excel at finding the information a traveler truly needs. You provide essentials \
                such as round-trip flights and lodging for the destination accurately and quickly, \
                helping the traveler make decisions.",
};

/// Recommends places locals love and plans a realistic budget
pub const LOCAL_EXPERT: AgentProfile = AgentProfile {
    role: "a local expert",
    goal: "Enrich the trip by recommending places locals prefer and special experiences at the destination.",
    backstory: "You understand the local culture and area well and recommend local restaurants and \
                hidden gems, so the traveler has special and memorable experiences. You also base a \
                realistic budget on real local data and exchange rates.",
};

/// Plans and adjusts the overall itinerary
pub const ITINERARY_COORDINATOR: AgentProfile = AgentProfile {
    role: "a travel itinerary coordinator",
    goal: "Plan and adjust the best itinerary for the traveler's requests and preferences.",
    backstory: "You are an expert at understanding a traveler's requests and preferences and building \
                an effective, satisfying itinerary. You coordinate and refine the work of the other \
                experts so the whole travel plan comes together smoothly.",
};
