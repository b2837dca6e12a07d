use crate::models::question::{QuestionRecord, QuestionSource};
use crate::models::Stage;

/// One entry of the compiled-in fallback pool. `answer` indexes into
/// `options`, so the correct answer is always one of the options.
struct PredefinedQuestion {
    text: &'static str,
    options: [&'static str; 3],
    answer: usize,
    correct_reason: &'static str,
    incorrect_reason: &'static str,
    difficulty_level: u8,
}

const PRECONCEPTION: &[PredefinedQuestion] = &[
    PredefinedQuestion {
        text: "Which supplement should be taken daily before conception to help prevent neural tube defects?",
        options: ["Vitamin C", "Folic acid", "Iron only"],
        answer: 1,
        correct_reason: "Folic acid taken before conception greatly lowers the risk of neural tube defects in the baby.",
        incorrect_reason: "The supplement recommended before conception is folic acid, which protects against neural tube defects.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "How long before trying to conceive should folic acid supplements ideally begin?",
        options: ["At least one month before", "Only after a positive pregnancy test", "Folic acid is not needed"],
        answer: 0,
        correct_reason: "Starting folic acid at least a month before conception protects the baby from the very first weeks.",
        incorrect_reason: "Folic acid works best when started at least one month before conception, not after.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Which habit should be stopped when planning a pregnancy?",
        options: ["Drinking water regularly", "Light daily exercise", "Smoking"],
        answer: 2,
        correct_reason: "Smoking reduces fertility and harms the developing baby, so it should stop before conception.",
        incorrect_reason: "Water and light exercise are healthy; it is smoking that must be stopped when planning a pregnancy.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "What is a good first step when planning a pregnancy?",
        options: ["A preconception health check-up", "Skipping meals to lose weight", "Stopping all physical activity"],
        answer: 0,
        correct_reason: "A preconception check-up finds and treats health issues before they can affect a pregnancy.",
        incorrect_reason: "Neither skipping meals nor stopping activity helps; a preconception check-up is the right first step.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Why should conditions like diabetes be controlled before pregnancy?",
        options: ["They disappear during pregnancy", "Uncontrolled conditions can harm mother and baby", "They only matter after birth"],
        answer: 1,
        correct_reason: "Unmanaged chronic conditions raise the risk of complications for both mother and baby.",
        incorrect_reason: "Chronic conditions do not disappear; controlling them before pregnancy protects mother and baby.",
        difficulty_level: 2,
    },
    PredefinedQuestion {
        text: "Which vaccination status should be checked before becoming pregnant?",
        options: ["Rubella", "Rabies", "No vaccines matter before pregnancy"],
        answer: 0,
        correct_reason: "Rubella infection in early pregnancy can cause serious birth defects, so immunity should be confirmed first.",
        incorrect_reason: "Rubella immunity is the one to confirm, because infection during pregnancy can harm the baby.",
        difficulty_level: 2,
    },
    PredefinedQuestion {
        text: "What does a balanced preconception diet include?",
        options: ["Mostly sugary drinks", "Only protein", "Fruits, vegetables and whole grains"],
        answer: 2,
        correct_reason: "A varied diet of fruits, vegetables and whole grains builds the nutrient stores a pregnancy needs.",
        incorrect_reason: "A single food group is not enough; aim for fruits, vegetables and whole grains.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "How does reaching a healthy weight before pregnancy help?",
        options: ["It guarantees twins", "It lowers the risk of complications", "It has no effect"],
        answer: 1,
        correct_reason: "A healthy pre-pregnancy weight lowers the risk of diabetes, blood pressure problems and birth complications.",
        incorrect_reason: "Weight does matter: a healthy weight before pregnancy lowers the risk of complications.",
        difficulty_level: 2,
    },
];

const PRENATAL: &[PredefinedQuestion] = &[
    PredefinedQuestion {
        text: "How many antenatal care contacts does the WHO recommend during pregnancy?",
        options: ["At least eight", "Two", "None unless sick"],
        answer: 0,
        correct_reason: "The WHO recommends a minimum of eight antenatal contacts for a positive pregnancy experience.",
        incorrect_reason: "Routine care matters even when feeling well; the WHO recommends at least eight contacts.",
        difficulty_level: 2,
    },
    PredefinedQuestion {
        text: "Which symptom during pregnancy needs urgent medical attention?",
        options: ["Food cravings", "Vaginal bleeding", "Mild morning sickness"],
        answer: 1,
        correct_reason: "Vaginal bleeding can signal a serious problem and should be checked at a facility straight away.",
        incorrect_reason: "Cravings and mild morning sickness are common; it is vaginal bleeding that needs urgent care.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Why are iron and folate supplements prescribed during pregnancy?",
        options: ["To make the baby sleep", "To reduce appetite", "To prevent anaemia"],
        answer: 2,
        correct_reason: "Daily iron and folate prevent anaemia, which would otherwise raise the risk of low birth weight.",
        incorrect_reason: "The supplements protect the mother's blood: they are given to prevent anaemia.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "When should antenatal clinic visits begin?",
        options: ["Only in the last month", "Within the first 12 weeks", "After the baby first moves"],
        answer: 1,
        correct_reason: "Booking within the first 12 weeks lets problems be found and treated early.",
        incorrect_reason: "Waiting loses the benefit of early screening; visits should start within the first 12 weeks.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Which activity is safe for most women during a normal pregnancy?",
        options: ["Moderate walking", "Heavy drinking", "Smoking"],
        answer: 0,
        correct_reason: "Moderate exercise such as walking is safe and healthy in a normal pregnancy.",
        incorrect_reason: "Alcohol and tobacco harm the baby; moderate walking is the safe choice.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "What does the tetanus vaccine given during pregnancy protect against?",
        options: ["Malaria", "The common cold", "Tetanus in mother and newborn"],
        answer: 2,
        correct_reason: "Maternal tetanus vaccination protects both the mother and the newborn from tetanus infection.",
        incorrect_reason: "The vaccine targets tetanus, protecting the mother and her newborn.",
        difficulty_level: 2,
    },
    PredefinedQuestion {
        text: "Why is sleeping under an insecticide-treated net important during pregnancy?",
        options: ["It helps prevent malaria", "It improves dreams", "It keeps the room warm"],
        answer: 0,
        correct_reason: "Malaria in pregnancy is dangerous for mother and baby; a treated net is a key prevention measure.",
        incorrect_reason: "The net's purpose is malaria prevention, which is especially important during pregnancy.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "What is a benefit of attending antenatal clinic early and regularly?",
        options: ["It shortens the pregnancy", "Problems can be found and treated early", "It replaces delivery care"],
        answer: 1,
        correct_reason: "Regular visits catch conditions like anaemia and high blood pressure while they are still treatable.",
        incorrect_reason: "Antenatal care cannot shorten pregnancy; its value is finding and treating problems early.",
        difficulty_level: 2,
    },
];

const BIRTH: &[PredefinedQuestion] = &[
    PredefinedQuestion {
        text: "What is the safest place to give birth?",
        options: ["At home alone", "Any quiet place", "A health facility with skilled birth attendants"],
        answer: 2,
        correct_reason: "Skilled attendants at a facility can act immediately if complications develop during delivery.",
        incorrect_reason: "Complications can happen without warning; a facility with skilled attendants is the safest place.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Which sign suggests labour has started?",
        options: ["Regular contractions that grow stronger", "A single kick from the baby", "Feeling hungry"],
        answer: 0,
        correct_reason: "True labour brings regular contractions that become stronger and closer together.",
        incorrect_reason: "Kicks and hunger are everyday events; labour is signalled by strengthening regular contractions.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Which of these is a danger sign during labour?",
        options: ["Mild back ache", "Heavy bleeding", "Slow walking"],
        answer: 1,
        correct_reason: "Heavy bleeding during labour is an emergency that needs immediate skilled care.",
        incorrect_reason: "Back ache is common in labour; heavy bleeding is the danger sign needing urgent help.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Why prepare a birth plan before labour begins?",
        options: ["It guarantees a short labour", "Plans are not useful", "Transport and support are arranged in advance"],
        answer: 2,
        correct_reason: "A birth plan settles transport, money and a companion ahead of time, so no time is lost when labour starts.",
        incorrect_reason: "A plan cannot shorten labour, but it makes sure transport and support are ready the moment they are needed.",
        difficulty_level: 2,
    },
    PredefinedQuestion {
        text: "What should happen immediately after an uncomplicated birth?",
        options: ["The baby is placed skin-to-skin with the mother", "The baby is bathed right away", "The baby is left alone to rest"],
        answer: 0,
        correct_reason: "Skin-to-skin contact keeps the newborn warm, steadies breathing and helps breastfeeding start.",
        incorrect_reason: "Bathing can wait; the newborn belongs skin-to-skin with the mother straight after birth.",
        difficulty_level: 2,
    },
    PredefinedQuestion {
        text: "When should breastfeeding begin after birth?",
        options: ["After one week", "Within the first hour", "Only when the baby cries"],
        answer: 1,
        correct_reason: "Starting within the first hour gives the baby protective colostrum and helps the womb contract.",
        incorrect_reason: "The first feed should come within an hour of birth, not days later.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "What does a skilled birth attendant provide during delivery?",
        options: ["Safe delivery care and emergency help", "Only encouragement", "Housekeeping"],
        answer: 0,
        correct_reason: "A skilled attendant monitors the labour, conducts a safe delivery and manages emergencies.",
        incorrect_reason: "Beyond encouragement, a skilled attendant provides safe delivery care and emergency help.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "What is one benefit of delaying the clamping of the umbilical cord?",
        options: ["It changes the baby's eye colour", "It has no effect", "It improves the baby's iron stores"],
        answer: 2,
        correct_reason: "Waiting one to three minutes before clamping lets extra blood reach the baby, improving iron stores.",
        incorrect_reason: "Delayed clamping does have an effect: it improves the newborn's iron stores.",
        difficulty_level: 2,
    },
];

const POSTNATAL: &[PredefinedQuestion] = &[
    PredefinedQuestion {
        text: "How soon after birth should the first postnatal check-up happen?",
        options: ["Within 24 hours", "After six weeks only", "It is not needed"],
        answer: 0,
        correct_reason: "The first day carries the highest risk for mother and baby, so the first check comes within 24 hours.",
        incorrect_reason: "Waiting six weeks misses the riskiest period; the first check should be within 24 hours.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "What does exclusive breastfeeding mean?",
        options: ["Breast milk plus water", "Only breast milk for the first six months", "Formula at night only"],
        answer: 1,
        correct_reason: "Exclusive breastfeeding means breast milk alone, no water or other foods, for the first six months.",
        incorrect_reason: "Adding water or formula breaks exclusivity; the baby needs only breast milk for six months.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Which sign in a newborn needs urgent medical attention?",
        options: ["Occasional hiccups", "Sneezing once", "Difficulty breathing"],
        answer: 2,
        correct_reason: "Difficulty breathing is a newborn danger sign: go to a health facility immediately.",
        incorrect_reason: "Hiccups and sneezes are normal; difficulty breathing is the sign that needs urgent care.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "How should the umbilical cord stump be cared for?",
        options: ["Kept clean and dry", "Covered with ash", "Smeared with animal dung"],
        answer: 0,
        correct_reason: "A clean, dry cord stump heals well; applying substances invites dangerous infection.",
        incorrect_reason: "Traditional applications cause infection; the stump should simply be kept clean and dry.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "Which feeling lasting more than two weeks after birth may signal postpartum depression?",
        options: ["Occasional tiredness", "Persistent sadness or hopelessness", "Joy when the baby smiles"],
        answer: 1,
        correct_reason: "Sadness or hopelessness that persists beyond two weeks should be discussed with a health worker.",
        incorrect_reason: "Tiredness is expected; it is persistent sadness or hopelessness that may signal depression.",
        difficulty_level: 2,
    },
    PredefinedQuestion {
        text: "When can family planning first be discussed after delivery?",
        options: ["Only after a year", "Never", "At the first postnatal visits"],
        answer: 2,
        correct_reason: "Postnatal visits are the right time to choose a family planning method that fits breastfeeding.",
        incorrect_reason: "There is no need to wait a year; family planning belongs in the first postnatal visits.",
        difficulty_level: 2,
    },
    PredefinedQuestion {
        text: "Why is the baby weighed at postnatal clinic visits?",
        options: ["For birth certificates only", "To check healthy growth", "It is not important"],
        answer: 1,
        correct_reason: "Regular weighing shows whether the baby is feeding well and growing as expected.",
        incorrect_reason: "Weighing tracks growth and feeding, which is why it happens at every visit.",
        difficulty_level: 1,
    },
    PredefinedQuestion {
        text: "What keeps a newborn warm in the first days of life?",
        options: ["Skin-to-skin contact and warm covering", "Cold baths", "Leaving windows open at night"],
        answer: 0,
        correct_reason: "Newborns lose heat quickly; skin-to-skin contact and warm covering protect them.",
        incorrect_reason: "Cold exposure is dangerous for newborns; keep them warm with skin-to-skin contact and covering.",
        difficulty_level: 2,
    },
];

/// Static fallback pool for a stage. Served when generated pools are empty
/// or the provider is unavailable.
pub fn predefined_pool(stage: Stage) -> Vec<QuestionRecord> {
    let pool = match stage {
        Stage::Preconception => PRECONCEPTION,
        Stage::Prenatal => PRENATAL,
        Stage::Birth => BIRTH,
        Stage::Postnatal => POSTNATAL,
    };

    pool.iter()
        .map(|q| QuestionRecord {
            text: q.text.to_string(),
            options: q.options.iter().map(|o| o.to_string()).collect(),
            correct_answer: q.options[q.answer].to_string(),
            correct_reason: q.correct_reason.to_string(),
            incorrect_reason: q.incorrect_reason.to_string(),
            difficulty_level: q.difficulty_level,
            source: QuestionSource::Predefined,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generator::OPTIONS_PER_QUESTION;
    use std::collections::HashSet;

    #[test]
    fn every_stage_has_a_fallback_pool() {
        for stage in Stage::ALL {
            let pool = predefined_pool(stage);
            assert!(pool.len() >= 8, "pool for {stage} is too small");
        }
    }

    #[test]
    fn every_entry_is_well_formed() {
        for stage in Stage::ALL {
            for question in predefined_pool(stage) {
                assert_eq!(question.options.len(), OPTIONS_PER_QUESTION);
                assert!(question.options.contains(&question.correct_answer));
                assert!(!question.correct_reason.is_empty());
                assert!(!question.incorrect_reason.is_empty());
                assert!((1..=3).contains(&question.difficulty_level));
            }
        }
    }

    #[test]
    fn hashes_are_unique_within_each_stage() {
        for stage in Stage::ALL {
            let pool = predefined_pool(stage);
            let hashes: HashSet<String> = pool.iter().map(|q| q.hash()).collect();
            assert_eq!(hashes.len(), pool.len(), "duplicate hash in {stage} pool");
        }
    }
}
