#![allow(dead_code)]

/// A few hundred letters of ordinary English prose.
pub const PASSAGE: &str = concat!(
    "It was a bright cold day in April and the clocks were striking thirteen. ",
    "The old harbour town had not changed much since the war, and the people who lived there ",
    "still spoke of the winter when the river froze and the boats could not leave the quay. ",
    "Every morning the baker opened his shop before the sun was up, and the smell of bread drifted ",
    "along the narrow streets where the children ran to school. ",
    "Nobody in the town could remember who had built the lighthouse on the northern cliff, ",
    "but everyone agreed that it was the finest thing they had ever seen. ",
    "When the storms came in from the sea the keeper would climb the long stair and light the great lamp, ",
    "and the ships that passed in the night would know that they were close to home. ",
    "There is a kind of comfort in knowing that someone is watching over you, ",
    "even if you will never meet them and never learn their name."
);

pub const SUBSTITUTION_KEY: &str = "QWERTYUIOPASDFGHJKLZXCVBNM";
