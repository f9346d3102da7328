//! Static step catalogue.
//!
//! # Invariants
//! - Step numbers are unique and strictly increasing.
//! - Only the opening step carries no SQL.

/// One lesson of the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub number: u32,
    pub title: &'static str,
    /// Short explanation printed above the result.
    pub lesson: &'static str,
    /// Literal statement sent to the engine. `None` for connection-only steps.
    pub sql: Option<&'static str>,
}

impl Step {
    pub fn is_query(&self) -> bool {
        self.sql.is_some()
    }
}

const STEPS: &[Step] = &[
    Step {
        number: 1,
        title: "Open the dataset",
        lesson: "Connect to the CRM dataset. Every following step reuses this one connection.",
        sql: None,
    },
    Step {
        number: 2,
        title: "Employees in USA offices (join)",
        lesson: "Baseline: join employees to offices and filter on the office country.",
        sql: Some(
            "SELECT lastName, firstName, officeCode
FROM employees
JOIN offices
    USING(officeCode)
WHERE country = 'USA'
;",
        ),
    },
    Step {
        number: 3,
        title: "Same question as a subquery",
        lesson: "The inner query lists USA office codes; the outer query keeps employees whose \
                 office code is in that list. No join needed.",
        sql: Some(
            "SELECT lastName, firstName, officeCode
FROM employees
WHERE officeCode IN (SELECT officeCode
                     FROM offices
                     WHERE country = 'USA')
;",
        ),
    },
    Step {
        number: 4,
        title: "Offices with five or more employees",
        lesson: "Filter on an aggregate: the subquery groups employees by office and keeps \
                 offices with at least five of them.",
        sql: Some(
            "SELECT lastName, firstName, officeCode
FROM employees
WHERE officeCode IN (
    SELECT officeCode
    FROM offices
    JOIN employees
        USING(officeCode)
    GROUP BY 1
    HAVING COUNT(employeeNumber) >= 5
)
;",
        ),
    },
    Step {
        number: 5,
        title: "Average of per-customer average payment",
        lesson: "Chain aggregates: average each customer's payments in a subquery, then \
                 average those averages.",
        sql: Some(
            "SELECT AVG(customerAvgPayment) AS averagePayment
FROM (
    SELECT AVG(amount) AS customerAvgPayment
    FROM payments
    JOIN customers
        USING(customerNumber)
    GROUP BY customerNumber
)
;",
        ),
    },
    Step {
        number: 6,
        title: "Sales reps of USA customers",
        lesson: "Cross-reference a foreign key: customers point at their sales rep, so the \
                 subquery yields employee numbers to match.",
        sql: Some(
            "SELECT lastName, firstName, employeeNumber
FROM employees
WHERE employeeNumber IN (SELECT salesRepEmployeeNumber
                         FROM customers
                         WHERE country = 'USA')
;",
        ),
    },
];

/// Returns the ordered catalogue.
pub fn steps() -> &'static [Step] {
    STEPS
}

/// Looks up one step by number.
pub fn find_step(number: u32) -> Option<&'static Step> {
    STEPS.iter().find(|step| step.number == number)
}
