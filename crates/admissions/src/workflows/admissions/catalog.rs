use serde::Serialize;

use super::domain::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchoolClass {
    pub id: &'static str,
    pub name: &'static str,
    pub level: Level,
}

/// Static reference entry for a school and its classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct School {
    pub id: &'static str,
    pub name: &'static str,
    pub code: &'static str,
    pub classes: &'static [SchoolClass],
}

const fn class(id: &'static str, name: &'static str, level: Level) -> SchoolClass {
    SchoolClass { id, name, level }
}

pub static SCHOOLS: [School; 4] = [
    School {
        id: "1",
        name: "Ingénieurs",
        code: "ING",
        classes: &[
            class("l1-info", "Licence 1 Informatique", Level::L1),
            class("l2-info", "Licence 2 Informatique", Level::L2),
            class("l3-info", "Licence 3 Informatique", Level::L3),
            class("m1-info", "Master 1 Informatique", Level::M1),
            class("m2-info", "Master 2 Informatique", Level::M2),
        ],
    },
    School {
        id: "2",
        name: "Droits",
        code: "DROIT",
        classes: &[
            class("l1-droit", "Licence 1 Droit", Level::L1),
            class("l2-droit", "Licence 2 Droit", Level::L2),
            class("l3-droit", "Licence 3 Droit", Level::L3),
            class("m1-droit", "Master 1 Droit", Level::M1),
            class("m2-droit", "Master 2 Droit", Level::M2),
        ],
    },
    School {
        id: "3",
        name: "Managements",
        code: "MGT",
        classes: &[
            class("l1-gestion", "Licence 1 Gestion", Level::L1),
            class("l2-gestion", "Licence 2 Gestion", Level::L2),
            class("l3-gestion", "Licence 3 Gestion", Level::L3),
            class("m1-gestion", "Master 1 Gestion", Level::M1),
            class("m2-gestion", "Master 2 Gestion", Level::M2),
        ],
    },
    School {
        id: "4",
        name: "Madiba",
        code: "MADIBA",
        classes: &[
            class("l1-madiba", "Licence 1 Madiba", Level::L1),
            class("l2-madiba", "Licence 2 Madiba", Level::L2),
            class("l3-madiba", "Licence 3 Madiba", Level::L3),
            class("m1-madiba", "Master 1 Madiba", Level::M1),
        ],
    },
];

pub fn schools() -> &'static [School] {
    &SCHOOLS
}

pub fn school_by_name(name: &str) -> Option<&'static School> {
    SCHOOLS.iter().find(|school| school.name == name)
}
