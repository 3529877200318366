//! The fixed set of mood questions and the series bundled under each.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub title: &'static str,
    pub question: &'static str,
    pub series: &'static [&'static str],
}

const CATALOG: &[Question] = &[
    Question {
        id: "home-hunt",
        title: "Home Hunt Helper",
        question: "Can I afford to buy a home or keep up with rent?",
        series: &[
            "MORTGAGE30US",
            "CSUSHPINSA",
            "CUSR0000SEHA",
            "HOUST",
            "MEHOINUSA672N",
            "MSPUS",
        ],
    },
    Question {
        id: "car-cost",
        title: "Car Cost Calculator",
        question: "Is buying or maintaining a car affordable?",
        series: &[
            "CUSR0000SETA01",
            "CUSR0000SETA02",
            "CUSR0000SETB",
            "TERMCBAUTO48NS",
            "DAUTOSAAR",
        ],
    },
    Question {
        id: "job-jolt",
        title: "Job Jolt",
        question: "Will I lose my job or find a better one?",
        series: &["UNRATE", "PAYEMS", "JTSJOL", "JTSQUR", "CES0500000003"],
    },
    Question {
        id: "grocery-gauge",
        title: "Grocery Gauge",
        question: "Can I afford groceries, gas, or other daily expenses?",
        series: &[
            "CUSR0000SAF11",
            "CUSR0000SETB",
            "CPILFESL",
            "PCEPI",
            "DSPIC96",
        ],
    },
    Question {
        id: "health-bill",
        title: "Health Bill Barometer",
        question: "Will healthcare or prescription drugs be affordable?",
        series: &[
            "CPIMEDSL",
            "PCU4461104461101",
            "DHLCRC1Q027SBEA",
            "ECIBEN",
            "CUSR0000SEMD",
        ],
    },
    Question {
        id: "tuition-tracker",
        title: "Tuition Tracker",
        question: "Is college or trade school affordable?",
        series: &["CUUR0000SEEB", "SLOAS", "CUSR0000SEEA", "PSAVERT"],
    },
    Question {
        id: "nest-egg",
        title: "Nest Egg Nugget",
        question: "Will I be able to retire comfortably?",
        series: &["PSAVERT", "SP500", "DGS10", "CPIAUCSL", "DSPIC96"],
    },
    Question {
        id: "bills-breakdown",
        title: "Bills Breakdown",
        question: "Can I keep up with utility bills or childcare costs?",
        series: &["CUSR0000SEHF01", "CUSR0000SEHF02", "DSPIC96"],
    },
    Question {
        id: "paycheck-power",
        title: "Paycheck Power",
        question: "Will my wages or savings keep up with rising prices?",
        series: &["CES0500000003", "CPIAUCSL", "PSAVERT", "PPIACO", "DSPIC96"],
    },
    Question {
        id: "rainy-day",
        title: "Rainy Day Radar",
        question: "Can I handle unexpected expenses like medical bills or repairs?",
        series: &[
            "PSAVERT",
            "CPIMEDSL",
            "CUSR0000SETD",
            "HDTGPDUSQ163N",
            "DSPIC96",
        ],
    },
];

pub fn catalog() -> &'static [Question] {
    CATALOG
}

pub fn find(id: &str) -> Option<&'static Question> {
    CATALOG.iter().find(|question| question.id == id)
}

/// Every distinct series code across the catalog, first-seen order.
pub fn all_series() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = Vec::new();
    for question in CATALOG {
        for code in question.series {
            if !codes.contains(code) {
                codes.push(code);
            }
        }
    }
    codes
}
