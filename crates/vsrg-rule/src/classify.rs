use crate::ruleset::Ruleset;

/// Highest grade index whose accuracy threshold is met, or -1 ("F").
///
/// Grades are ordered ascending by threshold in the ruleset.
pub fn grade_for(accuracy: f64, ruleset: &Ruleset) -> i32 {
    let mut best = -1;
    for (i, grade) in ruleset.grades.iter().enumerate() {
        if accuracy >= grade.accuracy_threshold {
            best = i as i32;
        }
    }
    best
}

/// Highest lamp index whose condition holds, or -1.
///
/// A lamp with `judgement == -1` requires `combo_breaks <= threshold`; any
/// other lamp requires the count of that judgement and every worse one to
/// stay within the threshold. Usable on interim state for snapshot lamps.
pub fn lamp_for(judgement_counts: &[u32], combo_breaks: u32, ruleset: &Ruleset) -> i32 {
    let mut best = -1;
    for (i, lamp) in ruleset.lamps.iter().enumerate() {
        let achieved = if lamp.judgement < 0 {
            combo_breaks <= lamp.threshold
        } else {
            let worse_or_equal: u32 = judgement_counts
                .iter()
                .skip(lamp.judgement as usize)
                .sum();
            worse_or_equal <= lamp.threshold
        };
        if achieved {
            best = i as i32;
        }
    }
    best
}
