//! Customer directory: the browsing/editing collaborator.
//!
//! Paged listing with prefix filters and a tri-state active flag, plus
//! create/update with field validation. Input is validated before any store
//! mutation; a rejected record changes nothing.

use dashmap::DashMap;

use datacap_core::error::{Error, Result};
use datacap_core::types::{Customer, CustomerFilter, Page, PageRequest, Subscription};

/// In-process customer table with per-customer subscription data.
#[derive(Debug, Default)]
pub struct CustomerDirectory {
    customers: DashMap<u32, Customer>,
    pub(crate) subscriptions: DashMap<u32, Subscription>,
}

impl CustomerDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new customer after validation.
    pub fn insert(&self, customer: Customer) -> Result<()> {
        validate(&customer)?;
        if self.customers.contains_key(&customer.id) {
            return Err(Error::InvalidInput(format!(
                "customer {} already exists",
                customer.id
            )));
        }
        self.customers.insert(customer.id, customer);
        Ok(())
    }

    /// Overwrite an existing customer's mutable fields after validation.
    ///
    /// The id is immutable: it selects the record and cannot be changed.
    pub fn update(&self, customer: Customer) -> Result<()> {
        validate(&customer)?;
        match self.customers.get_mut(&customer.id) {
            Some(mut entry) => {
                *entry = customer;
                Ok(())
            }
            None => Err(Error::CustomerNotFound(customer.id)),
        }
    }

    /// Fetch one customer by id.
    pub fn get(&self, id: u32) -> Result<Customer> {
        self.customers
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::CustomerNotFound(id))
    }

    /// Attach or replace a customer's subscription data.
    pub fn set_subscription(&self, customer_id: u32, subscription: Subscription) -> Result<()> {
        if !self.customers.contains_key(&customer_id) {
            return Err(Error::CustomerNotFound(customer_id));
        }
        self.subscriptions.insert(customer_id, subscription);
        Ok(())
    }

    /// Paged listing ordered by customer id.
    ///
    /// Prefix filters match case-insensitively; `filter.active == None`
    /// matches both active and inactive customers.
    pub fn list(&self, filter: &CustomerFilter, page: PageRequest) -> Result<Page<Customer>> {
        let first_prefix = filter.first_name_prefix.as_deref().map(str::to_lowercase);
        let last_prefix = filter.last_name_prefix.as_deref().map(str::to_lowercase);

        let mut matches: Vec<Customer> = self
            .customers
            .iter()
            .filter(|entry| {
                let c = entry.value();
                let first_ok = first_prefix
                    .as_deref()
                    .map_or(true, |p| c.first_name.to_lowercase().starts_with(p));
                let last_ok = last_prefix
                    .as_deref()
                    .map_or(true, |p| c.last_name.to_lowercase().starts_with(p));
                let active_ok = filter.active.map_or(true, |a| c.active == a);
                first_ok && last_ok && active_ok
            })
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by_key(|c| c.id);

        let total_items = matches.len();
        let start = (page.page - 1).saturating_mul(page.per_page);
        let items: Vec<Customer> = matches
            .into_iter()
            .skip(start)
            .take(page.per_page)
            .collect();

        Ok(Page {
            items,
            page: page.page,
            per_page: page.per_page,
            total_items,
        })
    }

    /// Number of customers on file.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub(crate) fn customer_snapshot(&self) -> Vec<Customer> {
        let mut all: Vec<Customer> = self
            .customers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|c| c.id);
        all
    }
}

fn validate(customer: &Customer) -> Result<()> {
    if customer.first_name.trim().is_empty() {
        return Err(Error::InvalidInput("first name is required".into()));
    }
    if customer.last_name.trim().is_empty() {
        return Err(Error::InvalidInput("last name is required".into()));
    }
    if !is_valid_email(&customer.email) {
        return Err(Error::InvalidInput(format!(
            "'{}' is not a valid email address",
            customer.email
        )));
    }
    if !is_valid_phone(&customer.phone) {
        return Err(Error::InvalidInput(
            "phone number must contain digits only".into(),
        ));
    }
    if customer.address.trim().is_empty() {
        return Err(Error::InvalidInput("address is required".into()));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_valid_phone(phone: &str) -> bool {
    !phone.is_empty() && phone.chars().all(|c| c.is_ascii_digit())
}
