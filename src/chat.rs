use crate::model::{Mood, Pet, Rules};
use rand::seq::SliceRandom;
use rand::RngCore;

/// Shown whenever a provider fails or has nothing to say.
pub(crate) const FALLBACK_LINE: &str = "Meow...";

/// Turns a pet snapshot into a short status line. Implementations may fail;
/// callers go through [`compose_or_fallback`].
pub(crate) trait ChatProvider {
    fn compose(&mut self, pet: &Pet, rng: &mut dyn RngCore) -> anyhow::Result<String>;
}

pub(crate) fn compose_or_fallback(
    provider: &mut dyn ChatProvider,
    pet: &Pet,
    rng: &mut dyn RngCore,
) -> String {
    match provider.compose(pet, rng) {
        Ok(line) if !line.trim().is_empty() => line,
        Ok(_) => FALLBACK_LINE.to_string(),
        Err(err) => {
            log::warn!("chat provider failed, using fallback: {err:#}");
            FALLBACK_LINE.to_string()
        }
    }
}

/// Offline provider backed by fixed line pools.
pub(crate) struct CannedChat {
    rules: Rules,
}

impl CannedChat {
    pub(crate) fn new(rules: &Rules) -> Self {
        Self {
            rules: rules.clone(),
        }
    }
}

impl ChatProvider for CannedChat {
    fn compose(&mut self, pet: &Pet, rng: &mut dyn RngCore) -> anyhow::Result<String> {
        let pool = lines_for(pet.mood(&self.rules));
        let line = pool
            .choose(rng)
            .ok_or_else(|| anyhow::anyhow!("empty line pool"))?;
        Ok((*line).to_string())
    }
}

fn lines_for(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Sick => &[
            "Meow... not feeling well...",
            "Need medicine...",
            "Meow... sick...",
            "Help me...",
            "Not good... meow...",
            "Feel dizzy...",
            "Need rest...",
            "Not my best day...",
        ],
        Mood::Sleeping => &[
            "Zzz... sleeping...",
            "Dreaming of fish...",
            "Shhh... sleeping...",
            "Nap time...",
            "So cozy... zzz...",
        ],
        Mood::Playing => &[
            "This is fun!",
            "Play with me more!",
            "Yay! Games!",
            "So exciting!",
            "Let's play again!",
        ],
        Mood::Dirty => &[
            "Meow... too dirty!",
            "Need a bath!",
            "Clean me please!",
            "Meow... stinky!",
            "Bath time!",
            "Time for cleanup!",
            "Feeling messy!",
            "Need some cleaning!",
        ],
        Mood::Hungry => &[
            "Meow... I'm hungry!",
            "Want some fish!",
            "Feed me please!",
            "Meow meow... hungry!",
            "Need food!",
            "My tummy is rumbling!",
            "Time for a snack?",
            "Hungry kitty needs food!",
        ],
        Mood::Happy => &[
            "Purr purr! So happy!",
            "Meow! I love you!",
            "Happy meow!",
            "Feeling great!",
            "Meow meow!",
            "Best day ever!",
            "You make me so happy!",
            "Life is wonderful!",
        ],
        Mood::Normal => &[
            "Meow!",
            "Meow meow!",
            "Hello!",
            "Purr...",
            "Meow! What's up?",
            "Feeling good!",
            "Meow meow meow!",
            "Happy to see you!",
            "Meow! Play with me!",
            "Purr purr purr!",
            "Nice to meet you!",
            "How are you?",
            "What's new?",
            "Let's have fun!",
            "You're the best!",
        ],
    }
}
